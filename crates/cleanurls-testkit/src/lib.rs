//! Test fixtures shared by the engine's unit and integration tests.
//!
//! [`FakeEntityStore`] plays the host platform's data generator and entity
//! store; [`StaticRouteTable`] stands in for the filesystem collision check;
//! the failing doubles exercise collaborator-error propagation.

use async_trait::async_trait;
use cleanurls_core::cache::{self, Namespace, PathCache};
use cleanurls_core::entity::Result;
use cleanurls_core::{
    CacheError, Category, Course, CourseModule, EntityId, EntityResolver, StoreError, User,
};
use cleanurls_rewriter::StaticRouteCheck;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory entity store with generator methods in the style of the host
/// platform's test data generator.
#[derive(Debug, Default)]
pub struct FakeEntityStore {
    categories: DashMap<EntityId, Category>,
    courses: DashMap<EntityId, Course>,
    users: DashMap<EntityId, User>,
    modules: DashMap<EntityId, CourseModule>,
    next_id: AtomicU64,
}

impl FakeEntityStore {
    pub fn new() -> Self {
        Self {
            // Id 1 is reserved for the synthetic site course.
            next_id: AtomicU64::new(2),
            ..Self::default()
        }
    }

    fn next_id(&self) -> EntityId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn create_category(&self, name: &str, parent: Option<EntityId>) -> Category {
        let category = Category {
            id: self.next_id(),
            name: name.to_owned(),
            parent,
        };
        self.categories.insert(category.id, category.clone());
        category
    }

    pub fn create_course(&self, shortname: &str, fullname: &str) -> Course {
        let course = Course {
            id: self.next_id(),
            shortname: shortname.to_owned(),
            fullname: fullname.to_owned(),
        };
        self.courses.insert(course.id, course.clone());
        course
    }

    pub fn create_user(&self, username: &str) -> User {
        let user = User {
            id: self.next_id(),
            username: username.to_owned(),
        };
        self.users.insert(user.id, user.clone());
        user
    }

    pub fn create_module(&self, modname: &str, course_id: EntityId, name: &str) -> CourseModule {
        let module = CourseModule {
            cmid: self.next_id(),
            course_id,
            modname: modname.to_owned(),
            name: name.to_owned(),
        };
        self.modules.insert(module.cmid, module.clone());
        module
    }
}

#[async_trait]
impl EntityResolver for FakeEntityStore {
    async fn course_by_id(&self, id: EntityId) -> Result<Option<Course>> {
        Ok(self.courses.get(&id).map(|c| c.value().clone()))
    }

    async fn course_by_shortname(&self, shortname: &str) -> Result<Option<Course>> {
        Ok(self
            .courses
            .iter()
            .find(|c| c.shortname == shortname)
            .map(|c| c.value().clone()))
    }

    async fn category_by_id(&self, id: EntityId) -> Result<Option<Category>> {
        Ok(self.categories.get(&id).map(|c| c.value().clone()))
    }

    async fn user_by_id(&self, id: EntityId) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }

    async fn module_by_cmid(&self, cmid: EntityId) -> Result<Option<CourseModule>> {
        Ok(self.modules.get(&cmid).map(|m| m.value().clone()))
    }
}

/// Collision check backed by an explicit route set instead of a filesystem.
#[derive(Debug, Default)]
pub struct StaticRouteTable {
    routes: DashSet<String>,
}

impl StaticRouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a static route, e.g. `course/ajax`.
    pub fn add(&self, route: &str) {
        self.routes.insert(route.to_owned());
    }
}

impl StaticRouteCheck for StaticRouteTable {
    fn shadows_static_route(&self, candidate: &str) -> bool {
        self.routes.contains(candidate)
    }
}

/// An entity store whose every lookup fails, for error-propagation tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEntityStore;

impl FailingEntityStore {
    fn down() -> StoreError {
        StoreError::Unavailable("entity store is down".to_owned())
    }
}

#[async_trait]
impl EntityResolver for FailingEntityStore {
    async fn course_by_id(&self, _id: EntityId) -> Result<Option<Course>> {
        Err(Self::down())
    }

    async fn course_by_shortname(&self, _shortname: &str) -> Result<Option<Course>> {
        Err(Self::down())
    }

    async fn category_by_id(&self, _id: EntityId) -> Result<Option<Category>> {
        Err(Self::down())
    }

    async fn user_by_id(&self, _id: EntityId) -> Result<Option<User>> {
        Err(Self::down())
    }

    async fn user_by_username(&self, _username: &str) -> Result<Option<User>> {
        Err(Self::down())
    }

    async fn module_by_cmid(&self, _cmid: EntityId) -> Result<Option<CourseModule>> {
        Err(Self::down())
    }
}

/// A path cache whose every operation fails, for error-propagation tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingPathCache;

#[async_trait]
impl PathCache for FailingPathCache {
    async fn get(&self, _namespace: Namespace, _key: &str) -> cache::Result<Option<String>> {
        Err(CacheError::Unavailable("path cache is down".to_owned()))
    }

    async fn set(&self, _namespace: Namespace, _key: &str, _value: &str) -> cache::Result<()> {
        Err(CacheError::Unavailable("path cache is down".to_owned()))
    }

    async fn del(&self, _namespace: Namespace, _key: &str) -> cache::Result<()> {
        Err(CacheError::Unavailable("path cache is down".to_owned()))
    }
}
