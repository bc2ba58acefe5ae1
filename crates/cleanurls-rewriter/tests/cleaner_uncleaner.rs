//! Clean/unclean round-trip scenarios for every supported URL shape, plus
//! the exclusion, configuration and caching behaviors.

use cleanurls_cache::InMemoryPathCache;
use cleanurls_core::{Config, Namespace, PathCache};
use cleanurls_rewriter::{Cleaner, NoStaticRoutes, Uncleaner};
use cleanurls_testkit::{FailingEntityStore, FailingPathCache, FakeEntityStore, StaticRouteTable};
use std::sync::Arc;

const WWWROOT: &str = "http://www.example.com/moodle";

fn abs(local: &str) -> String {
    format!("{}/{}", WWWROOT, local)
}

struct Harness {
    store: Arc<FakeEntityStore>,
    cache: Arc<InMemoryPathCache>,
    statics: Arc<StaticRouteTable>,
    config: Config,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(Config::new(WWWROOT))
    }

    fn with_config(config: Config) -> Self {
        Self {
            store: Arc::new(FakeEntityStore::new()),
            cache: Arc::new(InMemoryPathCache::new()),
            statics: Arc::new(StaticRouteTable::new()),
            config,
        }
    }

    fn cleaner(&self) -> Cleaner<Arc<FakeEntityStore>, Arc<InMemoryPathCache>, Arc<StaticRouteTable>> {
        Cleaner::new(
            Arc::clone(&self.store),
            Arc::clone(&self.cache),
            Arc::clone(&self.statics),
            self.config.clone(),
        )
    }

    fn uncleaner(&self) -> Uncleaner<Arc<FakeEntityStore>, Arc<InMemoryPathCache>> {
        Uncleaner::new(
            Arc::clone(&self.store),
            Arc::clone(&self.cache),
            self.config.clone(),
        )
    }

    /// Cleans `url`, expects `expected_clean`, then uncleans that result and
    /// expects `expected_unclean` (defaulting to the input URL).
    async fn assert_clean_unclean(
        &self,
        url: &str,
        expected_clean: &str,
        expected_unclean: Option<&str>,
    ) {
        let cleaned = self.cleaner().clean(url).await.unwrap();
        assert_eq!(cleaned, expected_clean, "clean of {}", url);

        let uncleaned = self.uncleaner().unclean(&cleaned).await.unwrap();
        assert_eq!(
            uncleaned,
            expected_unclean.unwrap_or(url),
            "unclean of {}",
            cleaned
        );
    }
}

#[tokio::test]
async fn it_always_cleans_the_probe_url() {
    // With cleaning on.
    let h = Harness::new();
    h.assert_clean_unclean(
        "/local/cleanurls/tests/foo.php",
        &abs("local/cleanurls/tests/bar"),
        Some(&abs("local/cleanurls/tests/foo.php")),
    )
    .await;

    // And with cleaning off.
    let h = Harness::with_config(Config::new(WWWROOT).with_cleaning(false));
    h.assert_clean_unclean(
        "/local/cleanurls/tests/foo.php",
        &abs("local/cleanurls/tests/bar"),
        Some(&abs("local/cleanurls/tests/foo.php")),
    )
    .await;
}

#[tokio::test]
async fn it_cannot_clean_if_destination_shadows_a_static_route() {
    let h = Harness::new();
    let course = h.store.create_course("ajax", "How to use ajax");
    h.statics.add("course/ajax");

    let url = abs(&format!("course/view.php?id={}", course.id));
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_cleans_category_urls() {
    let h = Harness::new();
    let category = h.store.create_category("category", None);

    h.assert_clean_unclean(
        &abs(&format!("course/index.php?categoryid={}", category.id)),
        &abs(&format!("category/category-{}", category.id)),
        None,
    )
    .await;
}

#[tokio::test]
async fn it_cleans_subcategory_urls() {
    let h = Harness::new();
    let category = h.store.create_category("category", None);
    let subcategory = h.store.create_category("subcategory", Some(category.id));

    h.assert_clean_unclean(
        &abs(&format!("course/index.php?categoryid={}", subcategory.id)),
        &abs(&format!(
            "category/category-{}/subcategory-{}",
            category.id, subcategory.id
        )),
        None,
    )
    .await;
}

#[tokio::test]
async fn it_cleans_course_module_view_urls() {
    let h = Harness::new();
    let course = h.store.create_course("shortname", "course long name");
    let forum = h.store.create_module("forum", course.id, "A Test Forum");

    h.assert_clean_unclean(
        &abs(&format!("mod/forum/view.php?id={}", forum.cmid)),
        &abs(&format!("course/shortname/forum/{}-a-test-forum", forum.cmid)),
        None,
    )
    .await;
}

#[tokio::test]
async fn it_cleans_course_modules_urls() {
    let h = Harness::new();
    let course = h.store.create_course("shortname", "course long name");

    h.assert_clean_unclean(
        &abs(&format!("mod/forum/index.php?id={}", course.id)),
        &abs("course/shortname/forum"),
        None,
    )
    .await;
}

#[tokio::test]
async fn it_cleans_course_urls_by_id() {
    let h = Harness::new();
    let course = h.store.create_course("shortname", "full name of the course");

    h.assert_clean_unclean(
        &abs(&format!("course/view.php?id={}", course.id)),
        &abs("course/shortname"),
        Some(&abs("course/view.php?name=shortname")),
    )
    .await;
}

#[tokio::test]
async fn it_cleans_course_with_hash_in_shortname() {
    let h = Harness::new();
    let course = h.store.create_course("short#name", "full name of the course #3");

    // The raw segment text is carried into the name parameter and re-escaped
    // on the query side, hence %23 in the path but %2523 in the query.
    h.assert_clean_unclean(
        &abs(&format!("course/view.php?id={}", course.id)),
        &abs("course/short%23name"),
        Some(&abs("course/view.php?name=short%2523name")),
    )
    .await;
}

#[tokio::test]
async fn it_cleans_course_urls_by_name() {
    let h = Harness::new();
    h.store.create_course("theshortname", "full name");

    h.assert_clean_unclean(
        &abs("course/view.php?name=theshortname"),
        &abs("course/theshortname"),
        None,
    )
    .await;
}

#[tokio::test]
async fn it_cleans_course_users_urls() {
    let h = Harness::new();
    let course = h.store.create_course("shortcoursename", "a course name");

    h.assert_clean_unclean(
        &abs(&format!("user/index.php?id={}", course.id)),
        &abs("course/shortcoursename/user"),
        None,
    )
    .await;
}

#[tokio::test]
async fn it_cleans_username_in_course() {
    let h = Harness::new();
    let course = h.store.create_course("mycourse", "a course");
    let user = h.store.create_user("theusername");

    // Duplicate course parameters: the last occurrence wins.
    h.assert_clean_unclean(
        &abs(&format!(
            "user/view.php?course=1&id={}&course={}",
            user.id, course.id
        )),
        &abs("course/mycourse/user/theusername"),
        Some(&abs(&format!(
            "user/view.php?id={}&course={}",
            user.id, course.id
        ))),
    )
    .await;
}

#[tokio::test]
async fn it_cleans_username_in_site_course() {
    let h = Harness::new();
    let user = h.store.create_user("theusername");

    h.assert_clean_unclean(
        &abs(&format!("user/view.php?course=1&id={}", user.id)),
        &abs("user/theusername?course=1"),
        Some(&abs(&format!("user/view.php?id={}&course=1", user.id))),
    )
    .await;
}

#[tokio::test]
async fn it_cleans_username_in_forum_discussion() {
    let h = Harness::new();
    let user = h.store.create_user("theusername");

    h.assert_clean_unclean(
        &abs(&format!("mod/forum/user.php?mode=discussions&id={}", user.id)),
        &abs("user/theusername/discussions"),
        Some(&abs(&format!(
            "mod/forum/user.php?id={}&mode=discussions",
            user.id
        ))),
    )
    .await;
}

#[tokio::test]
async fn it_cleans_username_urls() {
    let h = Harness::new();
    let user = h.store.create_user("theusername");

    h.assert_clean_unclean(
        &abs(&format!("user/profile.php?id={}", user.id)),
        &abs("user/theusername"),
        None,
    )
    .await;
}

#[tokio::test]
async fn it_does_not_clean_draftfile_urls() {
    let h = Harness::new();
    let url = "http://moodle.test/moodle/draftfile.php/5/user/draft/949704188/photo.jpg";
    // Foreign root as well as an excluded class; passes through untouched.
    h.assert_clean_unclean(url, url, None).await;

    let url = abs("draftfile.php/5/user/draft/949704188/photo.jpg");
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_does_not_clean_help_urls() {
    let h = Harness::new();
    let url = abs("help.php?blah=foo");
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_does_not_clean_lib_urls() {
    let h = Harness::new();
    let url = abs("lib/whatever.php");
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_does_not_clean_pluginfile_urls() {
    let h = Harness::new();
    let url = abs("pluginfile.php/12345/foo/bar");
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_does_not_clean_theme_urls() {
    let h = Harness::new();
    let url = abs("theme/whatever.php");
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_does_not_clean_forum_user_urls_in_other_modes() {
    let h = Harness::new();
    let user = h.store.create_user("theusername");

    let url = abs(&format!("mod/forum/user.php?mode=somethingelse&id={}", user.id));
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_does_not_clean_usernames_if_config_disabled() {
    let h = Harness::with_config(Config::new(WWWROOT).with_clean_usernames(false));
    let user = h.store.create_user("theusername");

    let url = abs(&format!("user/profile.php?id={}", user.id));
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_returns_the_same_url_if_cleaning_is_off() {
    let h = Harness::with_config(Config::new(WWWROOT).with_cleaning(false));

    let url = abs("cache/disabled-test.php");
    h.cache
        .set(Namespace::Outgoing, &url, &abs("disabledcachedurl"))
        .await
        .unwrap();

    // Cleaning disabled: the cached mapping must be ignored.
    h.assert_clean_unclean(&url, &url, None).await;
}

#[tokio::test]
async fn it_does_not_write_the_cache_while_cleaning_is_off() {
    let h = Harness::with_config(Config::new(WWWROOT).with_cleaning(false));
    let course = h.store.create_course("shortname", "full name");

    let url = abs(&format!("course/view.php?id={}", course.id));
    let cleaned = h.cleaner().clean(&url).await.unwrap();

    assert_eq!(cleaned, url);
    assert!(h.cache.is_empty(Namespace::Outgoing));
    assert!(h.cache.is_empty(Namespace::Incoming));
}

#[tokio::test]
async fn it_should_use_the_outgoing_cache() {
    let h = Harness::new();
    let url = abs("cache/test.php");
    let cached = abs("cachedurl.php");

    h.cache.set(Namespace::Outgoing, &url, &cached).await.unwrap();

    // The cached value is returned verbatim; no entity in the store could
    // have produced it, so a hit proves resolution was bypassed.
    h.assert_clean_unclean(&url, &cached, Some(&cached)).await;
}

#[tokio::test]
async fn it_should_use_the_incoming_cache() {
    let h = Harness::new();
    let clean = abs("course/shortname");
    let cached = abs("course/view.php?id=1234");

    h.cache.set(Namespace::Incoming, &clean, &cached).await.unwrap();

    let uncleaned = h.uncleaner().unclean(&clean).await.unwrap();
    assert_eq!(uncleaned, cached);
}

#[tokio::test]
async fn it_memoizes_successful_transforms() {
    let h = Harness::new();
    let course = h.store.create_course("shortname", "full name");

    let url = abs(&format!("course/view.php?id={}", course.id));
    let cleaned = h.cleaner().clean(&url).await.unwrap();
    assert_eq!(
        h.cache.get(Namespace::Outgoing, &url).await.unwrap().as_deref(),
        Some(cleaned.as_str())
    );

    let uncleaned = h.uncleaner().unclean(&cleaned).await.unwrap();
    assert_eq!(
        h.cache.get(Namespace::Incoming, &cleaned).await.unwrap().as_deref(),
        Some(uncleaned.as_str())
    );
}

#[tokio::test]
async fn it_does_not_clean_urls_of_unknown_courses() {
    let h = Harness::new();

    let url = abs("course/view.php?id=987654");
    h.assert_clean_unclean(&url, &url, None).await;
    assert!(h.cache.is_empty(Namespace::Outgoing));
}

#[tokio::test]
async fn it_passes_unknown_clean_shapes_through() {
    let h = Harness::new();

    let url = abs("some/random/path");
    let uncleaned = h.uncleaner().unclean(&url).await.unwrap();
    assert_eq!(uncleaned, url);
    assert!(h.cache.is_empty(Namespace::Incoming));
}

#[tokio::test]
async fn cache_failures_propagate() {
    let config = Config::new(WWWROOT);
    let store = FakeEntityStore::new();
    let course = store.create_course("shortname", "full name");
    let cleaner = Cleaner::new(store, FailingPathCache, NoStaticRoutes, config);

    let url = abs(&format!("course/view.php?id={}", course.id));
    assert!(cleaner.clean(&url).await.is_err());
}

#[tokio::test]
async fn entity_store_failures_propagate() {
    let config = Config::new(WWWROOT);
    let cleaner = Cleaner::new(
        FailingEntityStore,
        InMemoryPathCache::new(),
        NoStaticRoutes,
        config,
    );

    assert!(cleaner.clean(&abs("course/view.php?id=2")).await.is_err());
}
