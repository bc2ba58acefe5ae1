use crate::error::Result;
use crate::routes::{self, Route, RouteContext};
use crate::statics::NoStaticRoutes;
use cleanurls_core::{CleanPath, Config, EntityResolver, Namespace, OriginalUrl, PathCache};
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolves inbound clean paths back to original parameterized URLs.
///
/// Walks the same route table as the cleaner, in reverse: literal keywords
/// match verbatim, slugs resolve through the [`EntityResolver`]. A path that
/// matches no known shape passes through as-is — it is treated as an
/// already-original URL, never as a parse error.
pub struct Uncleaner<R, C> {
    resolver: Arc<R>,
    cache: Arc<C>,
    statics: NoStaticRoutes,
    config: Config,
    routes: Vec<Box<dyn Route>>,
}

impl<R: EntityResolver, C: PathCache> Uncleaner<R, C> {
    /// Creates a new uncleaner service.
    pub fn new(resolver: R, cache: C, config: Config) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cache: Arc::new(cache),
            statics: NoStaticRoutes,
            config,
            routes: routes::route_table(),
        }
    }

    /// Resolves a requested clean URL to its original form, consulting the
    /// incoming cache first and memoizing successful resolutions.
    pub async fn unclean(&self, requested: &str) -> Result<String> {
        let Some(path) = CleanPath::parse_local(requested, &self.config.wwwroot) else {
            trace!(url = requested, "not a local url, passing through");
            return Ok(requested.to_owned());
        };

        if path.local_path() == routes::PROBE_CLEAN {
            let probe = OriginalUrl::new(routes::PROBE_ORIGINAL);
            return Ok(probe.render(&self.config.wwwroot));
        }

        if let Some(original) = self.cache.get(Namespace::Incoming, requested).await? {
            debug!(url = requested, original = %original, "incoming cache hit");
            return Ok(original);
        }

        let ctx = RouteContext {
            resolver: self.resolver.as_ref(),
            statics: &self.statics,
            config: &self.config,
        };
        for route in &self.routes {
            if let Some(original) = route.unclean(&path, &ctx).await? {
                let rendered = original.render(&self.config.wwwroot);
                self.cache
                    .set(Namespace::Incoming, requested, &rendered)
                    .await?;
                debug!(url = requested, original = %rendered, "uncleaned url");
                return Ok(rendered);
            }
        }

        trace!(url = requested, "no route shape matched, passing through");
        Ok(requested.to_owned())
    }
}
