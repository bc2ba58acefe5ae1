//! Static-route collision check.
//!
//! A clean course path like `course/ajax` would shadow a real `course/ajax/`
//! directory or `course/ajax.php` script served by the platform. The
//! course-by-id rule refuses to clean in that case. Filesystem state is
//! external and can change between requests, so the check runs per request.

use std::path::PathBuf;
use std::sync::Arc;

/// Seam for the collision check, injectable for tests.
pub trait StaticRouteCheck: Send + Sync + 'static {
    /// Whether a candidate local path (e.g. `course/ajax`) would shadow an
    /// existing static route.
    fn shadows_static_route(&self, candidate: &str) -> bool;
}

impl<T: StaticRouteCheck + ?Sized> StaticRouteCheck for Arc<T> {
    fn shadows_static_route(&self, candidate: &str) -> bool {
        (**self).shadows_static_route(candidate)
    }
}

/// A check that never reports a collision. Used by the uncleaner (which only
/// consumes clean paths) and by embedders that serve no static routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStaticRoutes;

impl StaticRouteCheck for NoStaticRoutes {
    fn shadows_static_route(&self, _candidate: &str) -> bool {
        false
    }
}

/// Filesystem-backed check rooted at the platform's docroot.
#[derive(Debug, Clone)]
pub struct DirStaticRoutes {
    dirroot: PathBuf,
}

impl DirStaticRoutes {
    pub fn new(dirroot: impl Into<PathBuf>) -> Self {
        Self {
            dirroot: dirroot.into(),
        }
    }
}

impl StaticRouteCheck for DirStaticRoutes {
    fn shadows_static_route(&self, candidate: &str) -> bool {
        let base = self.dirroot.join(candidate);
        if base.is_dir() {
            return true;
        }
        let mut script = base.into_os_string();
        script.push(".php");
        PathBuf::from(script).is_file()
    }
}
