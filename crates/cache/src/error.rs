use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Failure reported by the injected repository bridge.
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Bridge request failed: {0}")]
    Request(String),

    #[error("Bridge response malformed: {0}")]
    MalformedResponse(String),
}

/// Errors crossing the cache boundary.
///
/// Only connection and network failures surface as errors; read operations
/// never fail and parsing problems resolve to best-effort fallbacks.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No active repository connection")]
    NoActiveConnection,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
