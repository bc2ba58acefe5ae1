use async_trait::async_trait;
use cleanurls_core::cache::Result;
use cleanurls_core::{Namespace, PathCache};
use dashmap::DashMap;
use tracing::trace;

/// In-memory implementation of [`PathCache`] using DashMap.
///
/// DashMap's sharded locks allow concurrent reads and writes to different
/// buckets without blocking, which fits the cache's last-writer-wins
/// memoization contract.
#[derive(Debug, Default)]
pub struct InMemoryPathCache {
    outgoing: DashMap<String, String>,
    incoming: DashMap<String, String>,
}

impl InMemoryPathCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, namespace: Namespace) -> &DashMap<String, String> {
        match namespace {
            Namespace::Outgoing => &self.outgoing,
            Namespace::Incoming => &self.incoming,
        }
    }

    /// Number of entries in a namespace.
    pub fn len(&self, namespace: Namespace) -> usize {
        self.map(namespace).len()
    }

    /// Whether a namespace holds no entries.
    pub fn is_empty(&self, namespace: Namespace) -> bool {
        self.map(namespace).is_empty()
    }
}

#[async_trait]
impl PathCache for InMemoryPathCache {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>> {
        let value = self.map(namespace).get(key).map(|v| v.value().clone());
        trace!(namespace = %namespace, key, hit = value.is_some(), "path cache lookup");
        Ok(value)
    }

    async fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<()> {
        trace!(namespace = %namespace, key, value, "path cache store");
        self.map(namespace).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn del(&self, namespace: Namespace, key: &str) -> Result<()> {
        self.map(namespace).remove(key);
        Ok(())
    }
}
