//! Cache capability used to hold the whole configuration snapshot

use async_trait::async_trait;
use econfig_errors::ConfigStoreResult;

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Simple key-value cache backend
///
/// Any backend offering get/set/delete of a single blob is acceptable.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value from cache as raw bytes
    async fn get(&self, key: &str) -> ConfigStoreResult<Option<Vec<u8>>>;

    /// Store a value, replacing any previous one
    async fn set(&self, key: &str, value: &[u8]) -> ConfigStoreResult<()>;

    /// Delete a value, returning whether it existed
    async fn delete(&self, key: &str) -> ConfigStoreResult<bool>;

    /// Get cache statistics
    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}
