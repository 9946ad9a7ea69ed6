use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use econfig_core::traits::{CacheBackend, CacheStats};
use econfig_errors::ConfigStoreResult;
use tokio::sync::RwLock;

#[derive(Clone)]
struct CacheEntry {
    value: Vec<u8>,
    stored_at: Instant,
}

/// Process-local cache with optional TTL
#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<RwLock<CacheStats>>,
    ttl: Option<Duration>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.ttl.map_or(true, |ttl| entry.stored_at.elapsed() < ttl)
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|e| self.is_fresh(e)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> ConfigStoreResult<Option<Vec<u8>>> {
        let value = {
            let entries = self.entries.read().await;
            entries
                .get(key)
                .filter(|e| self.is_fresh(e))
                .map(|e| e.value.clone())
        };

        let mut stats = self.stats.write().await;
        if value.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> ConfigStoreResult<()> {
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_vec(),
                stored_at: Instant::now(),
            },
        );
        self.stats.write().await.sets += 1;
        Ok(())
    }

    async fn delete(&self, key: &str) -> ConfigStoreResult<bool> {
        let removed = self
            .entries
            .write()
            .await
            .remove(key)
            .is_some_and(|e| self.is_fresh(&e));
        if removed {
            self.stats.write().await.deletes += 1;
        }
        Ok(removed)
    }

    async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.set("k", b"blob").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"blob".to_vec()));

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(cache.is_empty().await);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.deletes, 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = InMemoryCache::new();
        let other = cache.clone();
        cache.set("k", b"v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = InMemoryCache::with_ttl(Duration::from_millis(20));
        cache.set("k", b"v").await.unwrap();
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }
}
