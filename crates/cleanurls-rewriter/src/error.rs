use cleanurls_core::{CacheError, StoreError};
use thiserror::Error;

/// Result type for clean/unclean operations.
pub type Result<T> = std::result::Result<T, RewriteError>;

/// Failures surfaced by the rewrite engine.
///
/// Unresolvable URLs are never errors (they fall back to identity); these
/// variants only carry collaborator failures, which must reach the caller
/// because serving a wrong URL is worse than failing the page render.
#[derive(Debug, Clone, Error)]
pub enum RewriteError {
    #[error("path cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("entity store error: {0}")]
    Store(#[from] StoreError),
}
