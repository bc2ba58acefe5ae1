//! The route table: one descriptor per recognized URL shape, each knowing
//! how to build its clean path and how to parse it back.
//!
//! Both the cleaner and the uncleaner walk the same ordered table,
//! first-match-wins. A route that cannot resolve its entities reports "no
//! match" (`Ok(None)`) and the URL falls through, ultimately to the identity
//! transform. Collaborator failures propagate as errors.

use crate::error::Result;
use crate::statics::StaticRouteCheck;
use async_trait::async_trait;
use cleanurls_core::{
    slug, CleanPath, CleanUrl, Config, EntityResolver, OriginalUrl, SITE_COURSE_ID,
};
use tracing::debug;

/// Self-probe script rewritten unconditionally, even while cleaning is
/// disabled. The admin screen fetches the clean form to verify that the
/// webserver rewrite rules are in place.
pub const PROBE_ORIGINAL: &str = "local/cleanurls/tests/foo.php";

/// Clean form of [`PROBE_ORIGINAL`].
pub const PROBE_CLEAN: &str = "local/cleanurls/tests/bar";

/// Collaborators available to a route in either direction.
pub struct RouteContext<'a> {
    pub resolver: &'a dyn EntityResolver,
    pub statics: &'a dyn StaticRouteCheck,
    pub config: &'a Config,
}

/// A single URL shape, matchable in both directions.
#[async_trait]
pub trait Route: Send + Sync {
    /// Attempts to build the clean form of an original URL.
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>>;

    /// Attempts to rebuild the original URL from an inbound clean path.
    async fn unclean(&self, path: &CleanPath, ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>>;
}

/// The route table in priority order.
pub fn route_table() -> Vec<Box<dyn Route>> {
    vec![
        Box::new(CategoryRoute),
        Box::new(CourseUserIndexRoute),
        Box::new(ForumDiscussionsRoute),
        Box::new(ModuleViewRoute),
        Box::new(ModuleIndexRoute),
        Box::new(UserInCourseRoute),
        Box::new(UserProfileRoute),
        Box::new(CourseViewRoute),
    ]
}

/// Splits a `mod/<modname>/<script>` path into its module name and script.
fn mod_script(path: &str) -> Option<(&str, &str)> {
    let mut parts = path.split('/');
    if parts.next() != Some("mod") {
        return None;
    }
    let modname = parts.next()?;
    let script = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((modname, script))
}

/// Category parents can be mis-linked into a cycle in a corrupted store;
/// give up instead of walking forever.
const MAX_CATEGORY_DEPTH: usize = 32;

/// `course/index.php?categoryid=N` ⇄ `category/category-<rootId>[/subcategory-<id>...]`
///
/// The ancestor chain is walked root to leaf; the root contributes a
/// `category-` segment, every descendant a `subcategory-` segment, each
/// suffixed with its numeric id.
struct CategoryRoute;

#[async_trait]
impl Route for CategoryRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        if url.path() != "course/index.php" {
            return Ok(None);
        }
        let Some(category_id) = url.id_param("categoryid") else {
            return Ok(None);
        };

        let mut chain = Vec::new();
        let mut current = Some(category_id);
        while let Some(id) = current {
            if chain.len() >= MAX_CATEGORY_DEPTH {
                debug!(category_id, "category ancestor chain too deep, not cleaning");
                return Ok(None);
            }
            let Some(category) = ctx.resolver.category_by_id(id).await? else {
                return Ok(None);
            };
            current = category.parent;
            chain.push(category);
        }
        chain.reverse();

        let mut clean = CleanUrl::from_segments(["category"]);
        for (depth, category) in chain.iter().enumerate() {
            let label = if depth == 0 { "category" } else { "subcategory" };
            clean.push(format!("{}-{}", label, category.id));
        }
        Ok(Some(clean))
    }

    async fn unclean(&self, path: &CleanPath, _ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if path.raw(0) != Some("category") || path.len() < 2 {
            return Ok(None);
        }
        let Some(leaf) = path.raw(path.len() - 1) else {
            return Ok(None);
        };
        let Some(category_id) = slug::trailing_id(leaf) else {
            return Ok(None);
        };
        Ok(Some(
            OriginalUrl::new("course/index.php").with_param("categoryid", category_id.to_string()),
        ))
    }
}

/// `user/index.php?id=<courseid>` ⇄ `course/<shortname>/user`
struct CourseUserIndexRoute;

#[async_trait]
impl Route for CourseUserIndexRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        if url.path() != "user/index.php" {
            return Ok(None);
        }
        let Some(course_id) = url.id_param("id") else {
            return Ok(None);
        };
        let Some(course) = ctx.resolver.course_by_id(course_id).await? else {
            return Ok(None);
        };
        Ok(Some(CleanUrl::from_segments([
            "course",
            course.shortname.as_str(),
            "user",
        ])))
    }

    async fn unclean(&self, path: &CleanPath, ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if path.len() != 3 || path.raw(0) != Some("course") || path.raw(2) != Some("user") {
            return Ok(None);
        }
        let shortname = path.decoded(1).unwrap_or_default();
        let Some(course) = ctx.resolver.course_by_shortname(&shortname).await? else {
            return Ok(None);
        };
        Ok(Some(
            OriginalUrl::new("user/index.php").with_param("id", course.id.to_string()),
        ))
    }
}

/// `mod/forum/user.php?mode=discussions&id=<uid>` ⇄ `user/<username>/discussions`
///
/// The exclusion is mode-value-specific: any other `mode` value is not
/// cleaned at all.
struct ForumDiscussionsRoute;

#[async_trait]
impl Route for ForumDiscussionsRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        if url.path() != "mod/forum/user.php" || url.param("mode") != Some("discussions") {
            return Ok(None);
        }
        if !ctx.config.clean_usernames {
            return Ok(None);
        }
        let Some(user_id) = url.id_param("id") else {
            return Ok(None);
        };
        let Some(user) = ctx.resolver.user_by_id(user_id).await? else {
            return Ok(None);
        };
        Ok(Some(CleanUrl::from_segments([
            "user",
            user.username.as_str(),
            "discussions",
        ])))
    }

    async fn unclean(&self, path: &CleanPath, ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if path.len() != 3 || path.raw(0) != Some("user") || path.raw(2) != Some("discussions") {
            return Ok(None);
        }
        if !ctx.config.clean_usernames {
            return Ok(None);
        }
        let username = path.decoded(1).unwrap_or_default();
        let Some(user) = ctx.resolver.user_by_username(&username).await? else {
            return Ok(None);
        };
        Ok(Some(
            OriginalUrl::new("mod/forum/user.php")
                .with_param("id", user.id.to_string())
                .with_param("mode", "discussions"),
        ))
    }
}

/// `mod/<m>/view.php?id=<cmid>` ⇄ `course/<shortname>/<m>/<cmid>-<slug>`
struct ModuleViewRoute;

#[async_trait]
impl Route for ModuleViewRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        let Some((modname, "view.php")) = mod_script(url.path()) else {
            return Ok(None);
        };
        let Some(cmid) = url.id_param("id") else {
            return Ok(None);
        };
        let Some(module) = ctx.resolver.module_by_cmid(cmid).await? else {
            return Ok(None);
        };
        let Some(course) = ctx.resolver.course_by_id(module.course_id).await? else {
            return Ok(None);
        };
        Ok(Some(CleanUrl::from_segments([
            "course".to_owned(),
            course.shortname,
            modname.to_owned(),
            slug::module_segment(module.cmid, &module.name),
        ])))
    }

    async fn unclean(&self, path: &CleanPath, _ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if path.len() != 4 || path.raw(0) != Some("course") || path.raw(2) == Some("user") {
            return Ok(None);
        }
        let Some(cmid) = path.raw(3).and_then(slug::leading_id) else {
            return Ok(None);
        };
        let modname = path.decoded(2).unwrap_or_default();
        Ok(Some(
            OriginalUrl::new(format!("mod/{}/view.php", modname))
                .with_param("id", cmid.to_string()),
        ))
    }
}

/// `mod/<m>/index.php?id=<courseid>` ⇄ `course/<shortname>/<m>`
struct ModuleIndexRoute;

#[async_trait]
impl Route for ModuleIndexRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        let Some((modname, "index.php")) = mod_script(url.path()) else {
            return Ok(None);
        };
        let Some(course_id) = url.id_param("id") else {
            return Ok(None);
        };
        let Some(course) = ctx.resolver.course_by_id(course_id).await? else {
            return Ok(None);
        };
        Ok(Some(CleanUrl::from_segments([
            "course".to_owned(),
            course.shortname,
            modname.to_owned(),
        ])))
    }

    async fn unclean(&self, path: &CleanPath, ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if path.len() != 3 || path.raw(0) != Some("course") || path.raw(2) == Some("user") {
            return Ok(None);
        }
        let shortname = path.decoded(1).unwrap_or_default();
        let Some(course) = ctx.resolver.course_by_shortname(&shortname).await? else {
            return Ok(None);
        };
        let modname = path.decoded(2).unwrap_or_default();
        Ok(Some(
            OriginalUrl::new(format!("mod/{}/index.php", modname))
                .with_param("id", course.id.to_string()),
        ))
    }
}

/// `user/view.php?id=<uid>&course=<cid>` ⇄ `course/<shortname>/user/<username>`,
/// or `user/<username>?course=1` when the course is the synthetic site course
/// (which is not addressable as a path segment).
struct UserInCourseRoute;

#[async_trait]
impl Route for UserInCourseRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        if url.path() != "user/view.php" || !ctx.config.clean_usernames {
            return Ok(None);
        }
        let (Some(user_id), Some(course_id)) = (url.id_param("id"), url.id_param("course")) else {
            return Ok(None);
        };
        let Some(user) = ctx.resolver.user_by_id(user_id).await? else {
            return Ok(None);
        };
        if course_id == SITE_COURSE_ID {
            return Ok(Some(
                CleanUrl::from_segments(["user", user.username.as_str()])
                    .with_param("course", SITE_COURSE_ID.to_string()),
            ));
        }
        let Some(course) = ctx.resolver.course_by_id(course_id).await? else {
            return Ok(None);
        };
        Ok(Some(CleanUrl::from_segments([
            "course".to_owned(),
            course.shortname,
            "user".to_owned(),
            user.username,
        ])))
    }

    async fn unclean(&self, path: &CleanPath, ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if !ctx.config.clean_usernames {
            return Ok(None);
        }
        // In-course form: course/<shortname>/user/<username>
        if path.len() == 4 && path.raw(0) == Some("course") && path.raw(2) == Some("user") {
            let username = path.decoded(3).unwrap_or_default();
            let Some(user) = ctx.resolver.user_by_username(&username).await? else {
                return Ok(None);
            };
            let shortname = path.decoded(1).unwrap_or_default();
            let Some(course) = ctx.resolver.course_by_shortname(&shortname).await? else {
                return Ok(None);
            };
            return Ok(Some(
                OriginalUrl::new("user/view.php")
                    .with_param("id", user.id.to_string())
                    .with_param("course", course.id.to_string()),
            ));
        }
        // Site-course form: user/<username>?course=1
        if path.len() == 2 && path.raw(0) == Some("user") {
            let Some(course) = path.param("course") else {
                return Ok(None);
            };
            let username = path.decoded(1).unwrap_or_default();
            let Some(user) = ctx.resolver.user_by_username(&username).await? else {
                return Ok(None);
            };
            return Ok(Some(
                OriginalUrl::new("user/view.php")
                    .with_param("id", user.id.to_string())
                    .with_param("course", course),
            ));
        }
        Ok(None)
    }
}

/// `user/profile.php?id=<uid>` ⇄ `user/<username>`
struct UserProfileRoute;

#[async_trait]
impl Route for UserProfileRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        if url.path() != "user/profile.php" || !ctx.config.clean_usernames {
            return Ok(None);
        }
        let Some(user_id) = url.id_param("id") else {
            return Ok(None);
        };
        let Some(user) = ctx.resolver.user_by_id(user_id).await? else {
            return Ok(None);
        };
        Ok(Some(CleanUrl::from_segments(["user".to_owned(), user.username])))
    }

    async fn unclean(&self, path: &CleanPath, ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if path.len() != 2 || path.raw(0) != Some("user") || path.param("course").is_some() {
            return Ok(None);
        }
        if !ctx.config.clean_usernames {
            return Ok(None);
        }
        let username = path.decoded(1).unwrap_or_default();
        let Some(user) = ctx.resolver.user_by_username(&username).await? else {
            return Ok(None);
        };
        Ok(Some(
            OriginalUrl::new("user/profile.php").with_param("id", user.id.to_string()),
        ))
    }
}

/// `course/view.php?id=N|name=X` ⇄ `course/<shortname>`
///
/// The by-id direction refuses to clean when the destination would shadow a
/// static route (an existing `course/<shortname>/` directory or
/// `course/<shortname>.php` script) — ambiguous dispatch would break real
/// pages. The reverse direction carries the raw segment text into the
/// `name` parameter; re-escaping it at render time is what produces the
/// `%23` → `%2523` double-escape seen on the query side.
struct CourseViewRoute;

#[async_trait]
impl Route for CourseViewRoute {
    async fn clean(&self, url: &OriginalUrl, ctx: &RouteContext<'_>) -> Result<Option<CleanUrl>> {
        if url.path() != "course/view.php" {
            return Ok(None);
        }
        if let Some(name) = url.param("name") {
            return Ok(Some(CleanUrl::from_segments(["course", name])));
        }
        let Some(course_id) = url.id_param("id") else {
            return Ok(None);
        };
        let Some(course) = ctx.resolver.course_by_id(course_id).await? else {
            return Ok(None);
        };
        let candidate = format!("course/{}", course.shortname);
        if ctx.statics.shadows_static_route(&candidate) {
            debug!(candidate, "clean path would shadow a static route, not cleaning");
            return Ok(None);
        }
        Ok(Some(CleanUrl::from_segments(["course".to_owned(), course.shortname])))
    }

    async fn unclean(&self, path: &CleanPath, _ctx: &RouteContext<'_>) -> Result<Option<OriginalUrl>> {
        if path.len() != 2 || path.raw(0) != Some("course") {
            return Ok(None);
        }
        let Some(name) = path.raw(1) else {
            return Ok(None);
        };
        // A script path (course/view.php, course/index.php) is already an
        // original URL, not a shortname slug.
        if name.ends_with(".php") {
            return Ok(None);
        }
        Ok(Some(OriginalUrl::new("course/view.php").with_param("name", name)))
    }
}
