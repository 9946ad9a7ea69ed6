pub mod cache;
pub mod database;
pub mod factory;

pub use cache::*;
pub use database::*;
pub use factory::{connect, connect_cache, CacheType};
