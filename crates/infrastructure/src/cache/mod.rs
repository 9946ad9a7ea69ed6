//! Cache backends for the configuration snapshot
//!
//! The manager stores the whole snapshot as one blob, so a backend only
//! needs single-key get/set/delete.

pub mod memory;
pub mod redis_cache;

pub use memory::InMemoryCache;
pub use redis_cache::RedisCache;
