//! Redis cache backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use econfig_core::traits::{CacheBackend, CacheStats};
use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use redis::aio::ConnectionManager;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

/// Redis cache with a shared connection manager and metrics
pub struct RedisCache {
    /// Auto-reconnecting connection, cloned per command
    conn: ConnectionManager,
    /// Key prefix for this instance
    key_prefix: Option<String>,
    /// Expiry applied on every write, none means persistent
    ttl: Option<Duration>,
    stats: Arc<RwLock<CacheStats>>,
}

impl RedisCache {
    /// Connect and verify the server answers PING
    pub async fn new(
        redis_url: &str,
        key_prefix: Option<String>,
        ttl: Option<Duration>,
    ) -> ConfigStoreResult<Self> {
        info!("Creating Redis cache with URL: {}", redis_url);

        let client = redis::Client::open(redis_url)
            .map_err(|e| ConfigStoreError::config_error(format!("无效的Redis URL: {e}")))?;

        let mut conn = client
            .get_connection_manager()
            .await
            .map_err(|e| ConfigStoreError::cache_error(e.to_string()))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ConfigStoreError::cache_error(e.to_string()))?;

        info!("Redis cache created successfully");

        Ok(Self {
            conn,
            key_prefix: key_prefix.filter(|p| !p.is_empty()),
            ttl,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        })
    }

    /// Build full cache key with prefix
    fn build_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }

    async fn record_error(&self, op: &str, key: &str, err: redis::RedisError) -> ConfigStoreError {
        error!("Cache {} failed for key {}: {}", op, key, err);
        self.stats.write().await.errors += 1;
        ConfigStoreError::cache_error(err.to_string())
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> ConfigStoreResult<Option<Vec<u8>>> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let result: Option<Vec<u8>> = match redis::cmd("GET")
            .arg(&full_key)
            .query_async(&mut conn)
            .await
        {
            Ok(value) => value,
            Err(e) => return Err(self.record_error("GET", &full_key, e).await),
        };

        let mut stats = self.stats.write().await;
        if result.is_some() {
            debug!("Cache HIT: {}", full_key);
            stats.hits += 1;
        } else {
            debug!("Cache MISS: {}", full_key);
            stats.misses += 1;
        }
        Ok(result)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &[u8]) -> ConfigStoreResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let mut cmd = match self.ttl {
            Some(ttl) => {
                let mut cmd = redis::cmd("SETEX");
                cmd.arg(&full_key).arg(ttl.as_secs().max(1));
                cmd
            }
            None => {
                let mut cmd = redis::cmd("SET");
                cmd.arg(&full_key);
                cmd
            }
        };
        cmd.arg(value);

        let result: redis::RedisResult<()> = cmd.query_async(&mut conn).await;
        if let Err(e) = result {
            return Err(self.record_error("SET", &full_key, e).await);
        }

        debug!("Cache SET: {} ({} bytes)", full_key, value.len());
        self.stats.write().await.sets += 1;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> ConfigStoreResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let removed: i64 = match redis::cmd("DEL").arg(&full_key).query_async(&mut conn).await {
            Ok(count) => count,
            Err(e) => return Err(self.record_error("DEL", &full_key, e).await),
        };

        let deleted = removed > 0;
        if deleted {
            debug!("Cache DELETE success: {}", full_key);
            self.stats.write().await.deletes += 1;
        } else {
            debug!("Cache DELETE key not found: {}", full_key);
        }
        Ok(deleted)
    }

    async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
