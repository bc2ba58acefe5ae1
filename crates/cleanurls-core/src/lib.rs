//! Core types and traits for the clean URLs rewrite engine.
//!
//! This crate provides the shared URL model, configuration, entity model and
//! the trait seams (entity store, path cache) used by both the cleaner and
//! the uncleaner services.

pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod slug;
pub mod url;

pub use cache::{Namespace, PathCache};
pub use config::Config;
pub use entity::{Category, Course, CourseModule, EntityId, EntityResolver, User, SITE_COURSE_ID};
pub use error::{CacheError, StoreError};
pub use url::{CleanPath, CleanUrl, OriginalUrl};
