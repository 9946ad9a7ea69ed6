//! # EConfig
//!
//! Table-backed key-value configuration with an optional snapshot cache.
//!
//! ```ignore
//! use econfig::{connect, ConfigStoreSettings};
//!
//! let settings = ConfigStoreSettings::load(Some("econfig.toml"))?;
//! let manager = connect(&settings).await?;
//! manager.set("retries", 3).await?;
//! ```

pub mod cli;

pub use econfig_core::*;
pub use econfig_infrastructure::{
    connect, connect_cache, CacheType, DatabasePool, DatabaseType, InMemoryCache,
    PostgresConfigStore, RedisCache, SqliteConfigStore,
};
