use crate::bridge::RepositoryBridge;
use crate::error::{CacheError, Result};
use crate::hierarchy::Hierarchy;
use crate::stats::CacheStats;
use docmeta_dump::{parse_dump, DumpContext, ParsedDump};
use docmeta_model::{canonical_name, AttributeRecord, TypeNode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Callback fired after every successful refresh once the new snapshot is
/// visible. Invoked synchronously, in registration order.
pub type RefreshListener = Box<dyn Fn() + Send + Sync>;

struct CacheState {
    hierarchy: Arc<Hierarchy>,
    bridge: Option<Arc<dyn RepositoryBridge>>,
    generation: u64,
    last_refresh: Option<SystemTime>,
}

struct CacheInner {
    state: RwLock<CacheState>,
    /// Makes `refresh` idempotent under overlap: a call arriving while one is
    /// in flight returns immediately without fetching.
    refreshing: AtomicBool,
    listeners: Mutex<Vec<RefreshListener>>,
}

/// Owner of the in-process type hierarchy snapshot.
///
/// All reads are served from the current snapshot without blocking; `refresh`
/// rebuilds the whole hierarchy from the bridge's flat type list and swaps it
/// in atomically, and `fetch_details` lazily enriches one type with its
/// attribute list. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TypeCache {
    inner: Arc<CacheInner>,
}

impl TypeCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                state: RwLock::new(CacheState {
                    hierarchy: Arc::new(Hierarchy::default()),
                    bridge: None,
                    generation: 0,
                    last_refresh: None,
                }),
                refreshing: AtomicBool::new(false),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    #[must_use]
    pub fn with_bridge(bridge: Arc<dyn RepositoryBridge>) -> Self {
        let cache = Self::new();
        cache.attach_bridge(bridge);
        cache
    }

    /// Hand the cache a live repository connection.
    pub fn attach_bridge(&self, bridge: Arc<dyn RepositoryBridge>) {
        self.write_state().bridge = Some(bridge);
    }

    /// Drop the connection; subsequent network operations fail with
    /// [`CacheError::NoActiveConnection`]. The snapshot stays readable.
    pub fn detach_bridge(&self) {
        self.write_state().bridge = None;
    }

    // ------------------------------------------------------------------
    // Refresh lifecycle
    // ------------------------------------------------------------------

    /// Rebuild the hierarchy from the bridge's flat type list.
    ///
    /// All-or-nothing: a bridge failure leaves the previous snapshot intact.
    /// Reentrant-safe: an overlapping call is a no-op returning `Ok(())`;
    /// callers that need to wait poll [`has_data`](Self::has_data) or listen
    /// via [`on_refresh`](Self::on_refresh).
    pub async fn refresh(&self) -> Result<()> {
        if self
            .inner
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("type refresh already in flight; skipping");
            return Ok(());
        }

        let outcome = self.refresh_inner().await;
        self.inner.refreshing.store(false, Ordering::SeqCst);

        match outcome {
            Ok(type_count) => {
                log::info!("type hierarchy refreshed: {type_count} types");
                self.notify_listeners();
                Ok(())
            }
            Err(err) => {
                log::warn!("type refresh failed, keeping previous snapshot: {err}");
                Err(err)
            }
        }
    }

    async fn refresh_inner(&self) -> Result<usize> {
        let bridge = self.require_bridge()?;
        let descriptors = bridge.get_types().await?;
        let hierarchy = Hierarchy::build(&descriptors);
        let type_count = hierarchy.len();

        let mut state = self.write_state();
        state.hierarchy = Arc::new(hierarchy);
        state.generation += 1;
        state.last_refresh = Some(SystemTime::now());
        Ok(type_count)
    }

    /// Drop the snapshot wholesale. Reads afterwards yield empty results;
    /// registered listeners are kept.
    pub fn clear(&self) {
        let mut state = self.write_state();
        state.hierarchy = Arc::new(Hierarchy::default());
        state.generation += 1;
        state.last_refresh = None;
    }

    /// Register a refresh listener. Listeners are never dropped for the
    /// lifetime of the cache; there is no unregister.
    pub fn on_refresh(&self, listener: RefreshListener) {
        self.inner
            .listeners
            .lock()
            .expect("listener registry poisoned")
            .push(listener);
    }

    fn notify_listeners(&self) {
        let listeners = self.inner.listeners.lock().expect("listener registry poisoned");
        for listener in listeners.iter() {
            listener();
        }
    }

    // ------------------------------------------------------------------
    // Lazy attribute detail
    // ------------------------------------------------------------------

    /// Case-insensitive lookup with lazy attribute loading.
    ///
    /// Memoized: once a node's attributes are non-empty they are served from
    /// memory for the rest of the cache generation. A bridge failure degrades
    /// to returning the node without attributes so that a single type's fetch
    /// error does not break tree expansion. Unknown names yield `Ok(None)`.
    pub async fn fetch_details(&self, type_name: &str) -> Result<Option<TypeNode>> {
        let key = canonical_name(type_name);

        let (mut node, bridge, started_generation) = {
            let state = self.read_state();
            let Some(node) = state.hierarchy.get(&key).cloned() else {
                return Ok(None);
            };
            if node.is_loaded() {
                return Ok(Some(node));
            }
            let bridge = state.bridge.clone().ok_or(CacheError::NoActiveConnection)?;
            (node, bridge, state.generation)
        };

        let details = match bridge.get_type_details(&node.display_name).await {
            Ok(details) => details,
            Err(err) => {
                log::warn!("detail fetch for {key} degraded to bare node: {err}");
                return Ok(Some(node));
            }
        };

        let attributes: Vec<AttributeRecord> = details
            .attributes
            .iter()
            .map(|attr| {
                AttributeRecord::from_type_definition(
                    attr.name.clone(),
                    attr.data_type.clone(),
                    attr.length,
                    attr.is_repeating,
                    attr.is_inherited,
                )
            })
            .collect();
        node.attributes = attributes.clone();

        let mut state = self.write_state();
        if state.generation == started_generation {
            // Same-type races both compute identical data, so an overwrite
            // here is idempotent.
            let hierarchy = Arc::make_mut(&mut state.hierarchy);
            if let Some(stored) = hierarchy.get_mut(&key) {
                stored.attributes = attributes;
            }
        } else {
            log::debug!("discarding stale detail fetch for {key}");
        }

        Ok(Some(node))
    }

    /// Execute the repository's dump command for `target_id` and parse the
    /// returned text.
    pub async fn dump_object(&self, target_id: &str, ctx: &DumpContext) -> Result<ParsedDump> {
        let bridge = self.require_bridge()?;
        let raw = bridge.execute_dump(target_id).await?;
        Ok(parse_dump(&raw, ctx))
    }

    // ------------------------------------------------------------------
    // Read surface (never fails; unknown names yield empty/None)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn get_type(&self, type_name: &str) -> Option<TypeNode> {
        let key = canonical_name(type_name);
        self.read_state().hierarchy.get(&key).cloned()
    }

    #[must_use]
    pub fn is_type_name(&self, type_name: &str) -> bool {
        let key = canonical_name(type_name);
        self.read_state().hierarchy.get(&key).is_some()
    }

    /// Canonical names of a type's direct subtypes, sorted.
    #[must_use]
    pub fn get_child_types(&self, type_name: &str) -> Vec<String> {
        let key = canonical_name(type_name);
        self.read_state()
            .hierarchy
            .get(&key)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Canonical names of the hierarchy roots, sorted.
    #[must_use]
    pub fn get_root_types(&self) -> Vec<String> {
        self.read_state().hierarchy.roots().to_vec()
    }

    /// Stored attribute list for a type, optionally filtered to the ones the
    /// type defines itself. Empty if detail has not been fetched yet.
    #[must_use]
    pub fn get_attributes(&self, type_name: &str, include_inherited: bool) -> Vec<AttributeRecord> {
        let key = canonical_name(type_name);
        let state = self.read_state();
        let Some(node) = state.hierarchy.get(&key) else {
            return Vec::new();
        };
        if include_inherited {
            node.attributes.clone()
        } else {
            node.attributes
                .iter()
                .filter(|attr| !attr.is_inherited)
                .cloned()
                .collect()
        }
    }

    /// Case-insensitive substring search over all type names, sorted.
    #[must_use]
    pub fn search_types(&self, pattern: &str) -> Vec<String> {
        self.read_state().hierarchy.search(pattern)
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.read_state().hierarchy.is_empty()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read_state().generation
    }

    #[must_use]
    pub fn last_refresh_time(&self) -> Option<SystemTime> {
        self.read_state().last_refresh
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.read_state();
        let hierarchy = &state.hierarchy;
        CacheStats {
            type_count: hierarchy.len(),
            root_count: hierarchy.roots().len(),
            internal_count: hierarchy.nodes().filter(|n| n.is_internal).count(),
            loaded_detail_count: hierarchy.nodes().filter(|n| n.is_loaded()).count(),
            generation: state.generation,
            last_refresh_unix_ms: state.last_refresh.map(unix_ms),
        }
    }

    // ------------------------------------------------------------------

    fn require_bridge(&self) -> Result<Arc<dyn RepositoryBridge>> {
        self.read_state()
            .bridge
            .clone()
            .ok_or(CacheError::NoActiveConnection)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.inner.state.read().expect("cache state poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.inner.state.write().expect("cache state poisoned")
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
