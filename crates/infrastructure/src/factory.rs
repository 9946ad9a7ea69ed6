//! Wiring from [`ConfigStoreSettings`] to a ready [`ConfigManager`]

use std::sync::Arc;
use std::time::Duration;

use econfig_core::traits::CacheBackend;
use econfig_core::{ConfigManager, ConfigStoreSettings};
use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use tracing::info;

use crate::cache::{InMemoryCache, RedisCache};
use crate::database::DatabasePool;

/// Cache backend selected by URL scheme
#[derive(Debug, Clone, PartialEq)]
pub enum CacheType {
    Redis,
    Memory,
}

impl CacheType {
    pub fn from_url(url: &str) -> ConfigStoreResult<Self> {
        if url.starts_with("redis://") || url.starts_with("rediss://") {
            Ok(CacheType::Redis)
        } else if url.starts_with("memory://") {
            Ok(CacheType::Memory)
        } else {
            Err(ConfigStoreError::config_error(format!(
                "不支持的缓存URL: {url}"
            )))
        }
    }
}

/// Build the cache named by `cache_url`, or none when it is unset
pub async fn connect_cache(
    settings: &ConfigStoreSettings,
) -> ConfigStoreResult<Option<Arc<dyn CacheBackend>>> {
    let Some(url) = settings.cache_url.as_deref() else {
        return Ok(None);
    };
    let ttl = settings.cache_ttl_seconds.map(Duration::from_secs);

    let cache: Arc<dyn CacheBackend> = match CacheType::from_url(url)? {
        CacheType::Redis => Arc::new(
            RedisCache::new(url, settings.cache_key_prefix.clone(), ttl).await?,
        ),
        CacheType::Memory => match ttl {
            Some(ttl) => Arc::new(InMemoryCache::with_ttl(ttl)),
            None => Arc::new(InMemoryCache::new()),
        },
    };
    Ok(Some(cache))
}

/// Open the database, connect the cache and load the snapshot
pub async fn connect(settings: &ConfigStoreSettings) -> ConfigStoreResult<ConfigManager> {
    settings.validate()?;

    let pool = DatabasePool::new(&settings.database_url, settings.max_connections).await?;
    let cache = connect_cache(settings).await?;

    let manager = ConfigManager::builder()
        .with_settings(settings)
        .store(pool.config_store())
        .maybe_cache(cache)
        .build()
        .await?;

    info!(
        "EConfig ready: table {}, {} entries, database {:?}",
        manager.table_name(),
        manager.len().await,
        pool.database_type()
    );
    Ok(manager)
}
