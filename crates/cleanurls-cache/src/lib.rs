//! Path cache implementations shared by the cleaner and uncleaner services.

pub mod memory;
pub mod moka;

pub use memory::InMemoryPathCache;
pub use moka::{MokaCacheConfig, MokaPathCache};
