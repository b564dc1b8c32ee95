use serde::{Deserialize, Serialize};

/// Point-in-time summary of cache contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total types in the current snapshot.
    pub type_count: usize,

    /// Hierarchy roots.
    pub root_count: usize,

    /// Types flagged internal by the source system.
    pub internal_count: usize,

    /// Types whose attribute detail has been lazily loaded.
    pub loaded_detail_count: usize,

    /// Snapshot generation; bumps on every successful refresh and on clear.
    pub generation: u64,

    /// Completion time of the last successful refresh, unix milliseconds.
    pub last_refresh_unix_ms: Option<u64>,
}
