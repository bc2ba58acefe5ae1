use crate::error::CacheError;
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;

/// Result type for path cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Memoization direction for a cached URL mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// original URL → clean URL
    Outgoing,
    /// clean URL → original URL
    Incoming,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Outgoing => "outgoing",
            Namespace::Incoming => "incoming",
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key→value store memoizing resolved URL mappings.
///
/// Entries are pure memoizations of a deterministic transform, so
/// last-writer-wins overwrites are acceptable and no expiry is required.
/// Implementations must support concurrent readers and writers.
#[async_trait]
pub trait PathCache: Send + Sync + 'static {
    /// Looks up a mapping. Returns `Ok(None)` on a miss.
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>>;

    /// Stores a mapping, overwriting any previous value for the key.
    async fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<()>;

    /// Removes a mapping. It is not an error if the key does not exist.
    async fn del(&self, namespace: Namespace, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: PathCache + ?Sized> PathCache for Arc<T> {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>> {
        (**self).get(namespace, key).await
    }

    async fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<()> {
        (**self).set(namespace, key, value).await
    }

    async fn del(&self, namespace: Namespace, key: &str) -> Result<()> {
        (**self).del(namespace, key).await
    }
}
