use async_trait::async_trait;
use cleanurls_core::cache::Result;
use cleanurls_core::{Namespace, PathCache};
use moka::future::Cache;
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// Configuration for a [`MokaPathCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MokaCacheConfig {
    /// Maximum number of entries held per namespace.
    #[builder(default = 10_000)]
    pub max_capacity: u64,
    /// Optional time-to-live for entries.
    #[builder(default, setter(strip_option))]
    pub ttl: Option<Duration>,
}

impl Default for MokaCacheConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Bounded in-memory implementation of [`PathCache`] using Moka.
///
/// Entries memoize a deterministic transform, so eviction only costs a
/// re-resolution on the next request. Each namespace gets its own cache so
/// pressure on one direction cannot evict the other.
#[derive(Debug, Clone)]
pub struct MokaPathCache {
    outgoing: Cache<String, String>,
    incoming: Cache<String, String>,
}

impl MokaPathCache {
    /// Creates a cache with default settings (10,000 entries per namespace,
    /// no expiry).
    pub fn new() -> Self {
        Self::with_config(MokaCacheConfig::default())
    }

    /// Creates a cache from an explicit configuration.
    pub fn with_config(config: MokaCacheConfig) -> Self {
        let build = || {
            let mut builder = Cache::builder().max_capacity(config.max_capacity);
            if let Some(ttl) = config.ttl {
                builder = builder.time_to_live(ttl);
            }
            builder.build()
        };
        Self {
            outgoing: build(),
            incoming: build(),
        }
    }

    /// Creates a cache with a custom per-namespace capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::with_config(MokaCacheConfig::builder().max_capacity(max_capacity).build())
    }

    fn cache(&self, namespace: Namespace) -> &Cache<String, String> {
        match namespace {
            Namespace::Outgoing => &self.outgoing,
            Namespace::Incoming => &self.incoming,
        }
    }
}

impl Default for MokaPathCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PathCache for MokaPathCache {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>> {
        match self.cache(namespace).get(key).await {
            Some(value) => {
                debug!(namespace = %namespace, key, "path cache hit");
                Ok(Some(value))
            }
            None => {
                trace!(namespace = %namespace, key, "path cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, namespace: Namespace, key: &str, value: &str) -> Result<()> {
        trace!(namespace = %namespace, key, value, "path cache store");
        self.cache(namespace)
            .insert(key.to_owned(), value.to_owned())
            .await;
        Ok(())
    }

    async fn del(&self, namespace: Namespace, key: &str) -> Result<()> {
        self.cache(namespace).invalidate(key).await;
        Ok(())
    }
}
