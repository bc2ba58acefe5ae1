use crate::error::Result;
use crate::exclusions;
use crate::routes::{self, Route, RouteContext};
use crate::statics::StaticRouteCheck;
use cleanurls_core::{CleanUrl, Config, EntityResolver, Namespace, OriginalUrl, PathCache};
use std::sync::Arc;
use tracing::{debug, trace};

/// Transforms original parameterized URLs into clean hierarchical paths.
///
/// The service wraps an [`EntityResolver`], a [`PathCache`] and a
/// [`StaticRouteCheck`] and walks the shared route table. For a cleanable
/// URL under a fixed configuration the transform is deterministic, which is
/// what makes the cache a pure memoization layer.
pub struct Cleaner<R, C, S> {
    resolver: Arc<R>,
    cache: Arc<C>,
    statics: Arc<S>,
    config: Config,
    routes: Vec<Box<dyn Route>>,
}

impl<R: EntityResolver, C: PathCache, S: StaticRouteCheck> Cleaner<R, C, S> {
    /// Creates a new cleaner service.
    pub fn new(resolver: R, cache: C, statics: S, config: Config) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cache: Arc::new(cache),
            statics: Arc::new(statics),
            config,
            routes: routes::route_table(),
        }
    }

    /// Cleans a URL, returning it unchanged whenever it cannot (or must not)
    /// be cleaned.
    ///
    /// Order of checks: locality, self-probe, master switch, exclusion set,
    /// outgoing cache, route table. The cache is only touched while cleaning
    /// is enabled, and only successful non-identity transforms are stored.
    pub async fn clean(&self, original: &str) -> Result<String> {
        let Some(url) = OriginalUrl::parse_local(original, &self.config.wwwroot) else {
            trace!(url = original, "not a local url, passing through");
            return Ok(original.to_owned());
        };

        if url.path() == routes::PROBE_ORIGINAL {
            let probe = CleanUrl::from_segments(routes::PROBE_CLEAN.split('/'));
            return Ok(probe.render(&self.config.wwwroot));
        }

        if !self.config.cleaning_on {
            return Ok(original.to_owned());
        }

        if exclusions::is_excluded(url.path()) {
            debug!(url = original, "excluded url class, passing through");
            return Ok(original.to_owned());
        }

        if let Some(clean) = self.cache.get(Namespace::Outgoing, original).await? {
            debug!(url = original, clean = %clean, "outgoing cache hit");
            return Ok(clean);
        }

        let ctx = RouteContext {
            resolver: self.resolver.as_ref(),
            statics: self.statics.as_ref(),
            config: &self.config,
        };
        for route in &self.routes {
            if let Some(clean) = route.clean(&url, &ctx).await? {
                let rendered = clean.render(&self.config.wwwroot);
                self.cache
                    .set(Namespace::Outgoing, original, &rendered)
                    .await?;
                debug!(url = original, clean = %rendered, "cleaned url");
                return Ok(rendered);
            }
        }

        trace!(url = original, "no route matched, passing through");
        Ok(original.to_owned())
    }
}
