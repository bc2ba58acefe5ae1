use thiserror::Error;

/// Errors raised by path cache backends.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors raised by the host platform's entity store.
///
/// "Entity not found" is not an error: resolver methods return `Ok(None)` and
/// callers fall back to the identity transform. These variants cover the only
/// real failure class, an unreachable or misbehaving collaborator, which must
/// propagate to the caller.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("entity store unavailable: {0}")]
    Unavailable(String),
    #[error("entity store operation timed out: {0}")]
    Timeout(String),
    #[error("entity store query failed: {0}")]
    Query(String),
    #[error("stored entity data is invalid: {0}")]
    InvalidData(String),
}
