//! Bidirectional URL rewrite engine.
//!
//! The [`Cleaner`] turns the platform's parameter-based URLs into
//! human-readable hierarchical paths; the [`Uncleaner`] resolves an inbound
//! clean path back to the original URL. Both walk the same ordered
//! [route table](routes::route_table), consult the path cache before doing
//! any entity resolution, and fall back to the identity transform whenever a
//! URL cannot be mapped.

pub mod cleaner;
pub mod error;
pub mod exclusions;
pub mod routes;
pub mod statics;
pub mod uncleaner;

pub use cleaner::Cleaner;
pub use error::{Result, RewriteError};
pub use statics::{DirStaticRoutes, NoStaticRoutes, StaticRouteCheck};
pub use uncleaner::Uncleaner;
