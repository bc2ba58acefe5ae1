use crate::error::StoreError;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for entity store lookups.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Numeric identifier assigned by the host platform.
pub type EntityId = u64;

/// The platform's synthetic top-level "site" course. It is not addressable
/// as an ordinary course path segment.
pub const SITE_COURSE_ID: EntityId = 1;

/// A course category, a node in the category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    /// Parent category, `None` for a root category.
    pub parent: Option<EntityId>,
}

/// A course. The shortname doubles as its clean path slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: EntityId,
    pub shortname: String,
    pub fullname: String,
}

/// A user account. The username doubles as its clean path slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: EntityId,
    pub username: String,
}

/// An activity module instance placed in a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseModule {
    /// The course-module id, as used in `mod/<modname>/view.php?id=...`.
    pub cmid: EntityId,
    pub course_id: EntityId,
    /// The module type name, e.g. `forum`.
    pub modname: String,
    /// The instance display name, e.g. `A Test Forum`.
    pub name: String,
}

/// Read-only facade over the host platform's entity store.
///
/// Every method returns `Ok(None)` for "not found"; callers treat that as
/// "cannot clean/unclean this segment" and fall back to the identity
/// transform. Errors mean the store itself is unreachable and propagate.
#[async_trait]
pub trait EntityResolver: Send + Sync + 'static {
    async fn course_by_id(&self, id: EntityId) -> Result<Option<Course>>;

    async fn course_by_shortname(&self, shortname: &str) -> Result<Option<Course>>;

    async fn category_by_id(&self, id: EntityId) -> Result<Option<Category>>;

    async fn user_by_id(&self, id: EntityId) -> Result<Option<User>>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn module_by_cmid(&self, cmid: EntityId) -> Result<Option<CourseModule>>;
}

#[async_trait]
impl<T: EntityResolver + ?Sized> EntityResolver for Arc<T> {
    async fn course_by_id(&self, id: EntityId) -> Result<Option<Course>> {
        (**self).course_by_id(id).await
    }

    async fn course_by_shortname(&self, shortname: &str) -> Result<Option<Course>> {
        (**self).course_by_shortname(shortname).await
    }

    async fn category_by_id(&self, id: EntityId) -> Result<Option<Category>> {
        (**self).category_by_id(id).await
    }

    async fn user_by_id(&self, id: EntityId) -> Result<Option<User>> {
        (**self).user_by_id(id).await
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        (**self).user_by_username(username).await
    }

    async fn module_by_cmid(&self, cmid: EntityId) -> Result<Option<CourseModule>> {
        (**self).module_by_cmid(cmid).await
    }
}
