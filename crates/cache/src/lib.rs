//! # Docmeta Cache
//!
//! In-process, inheritance-aware view of a content repository's type system.
//!
//! ## Architecture
//!
//! ```text
//! RepositoryBridge (injected collaborator)
//!     │
//!     ├──> refresh()        flat type list ──> Hierarchy (build-then-swap)
//!     ├──> fetch_details()  per-type attribute detail, memoized lazily
//!     └──> dump_object()    raw dump text ──> docmeta-dump parser
//!
//! TypeCache
//!     ├─ snapshot: Arc<Hierarchy>, replaced atomically on refresh
//!     ├─ generation counter invalidating stale in-flight fetches
//!     ├─ read surface: get_type / children / roots / search / attributes
//!     └─ on_refresh listeners, fired synchronously post-swap
//! ```
//!
//! Readers always see either the previous complete snapshot or the new one,
//! never a half-built hierarchy. A failed refresh leaves the prior snapshot
//! fully intact.

mod bridge;
mod cache;
mod error;
mod hierarchy;
mod stats;

pub use bridge::RepositoryBridge;
pub use cache::{RefreshListener, TypeCache};
pub use error::{BridgeError, CacheError, Result};
pub use hierarchy::Hierarchy;
pub use stats::CacheStats;
