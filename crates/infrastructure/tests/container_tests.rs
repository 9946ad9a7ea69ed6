//! PostgreSQL and Redis backends against real servers

use std::sync::Arc;
use std::time::Duration;

use econfig_core::traits::{CacheBackend, ConfigEntry, ConfigStore};
use econfig_core::{ConfigStoreSettings, Value};
use econfig_infrastructure::{connect, PostgresConfigStore, RedisCache};
use econfig_testing_utils::{DatabaseTestContainer, RedisTestContainer};

#[tokio::test]
#[ignore] // requires Docker
async fn test_postgres_store_operations() {
    let container = DatabaseTestContainer::new().await.unwrap();
    let store = PostgresConfigStore::new(container.pool.clone());
    store.ensure_table("configs").await.unwrap();

    store
        .insert("configs", &ConfigEntry::new("a", "1"))
        .await
        .unwrap();
    store
        .replace_many(
            "configs",
            &[ConfigEntry::new("a", "2"), ConfigEntry::new("b", "3")],
        )
        .await
        .unwrap();
    assert!(store
        .update("configs", &ConfigEntry::new("b", "4"))
        .await
        .unwrap());

    let rows = store.scan_all("configs").await.unwrap();
    assert_eq!(
        rows,
        vec![ConfigEntry::new("a", "2"), ConfigEntry::new("b", "4")]
    );

    assert_eq!(
        store
            .delete_by_keys("configs", &["a".to_string()])
            .await
            .unwrap(),
        1
    );
    assert_eq!(store.delete_all("configs").await.unwrap(), 1);
}

#[tokio::test]
#[ignore] // requires Docker
async fn test_redis_cache_operations() {
    let container = RedisTestContainer::new().await.unwrap();
    let cache = RedisCache::new(&container.redis_url, Some("test".to_string()), None)
        .await
        .unwrap();

    assert_eq!(cache.get("blob").await.unwrap(), None);
    cache.set("blob", b"{}").await.unwrap();
    assert_eq!(cache.get("blob").await.unwrap(), Some(b"{}".to_vec()));
    assert!(cache.delete("blob").await.unwrap());
    assert!(!cache.delete("blob").await.unwrap());

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.sets, 1);
    assert_eq!(stats.deletes, 1);
}

#[tokio::test]
#[ignore] // requires Docker
async fn test_redis_cache_ttl_expires() {
    let container = RedisTestContainer::new().await.unwrap();
    let cache = RedisCache::new(&container.redis_url, None, Some(Duration::from_secs(1)))
        .await
        .unwrap();

    cache.set("blob", b"{}").await.unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(cache.get("blob").await.unwrap(), None);
}

#[tokio::test]
#[ignore] // requires Docker
async fn test_connect_postgres_and_redis() {
    let database = DatabaseTestContainer::new().await.unwrap();
    let redis = RedisTestContainer::new().await.unwrap();
    let settings = ConfigStoreSettings {
        database_url: database.database_url.clone(),
        cache_url: Some(redis.redis_url.clone()),
        cache_key_prefix: Some("econfig".to_string()),
        coding: "json".to_string(),
        ..Default::default()
    };

    let manager = connect(&settings).await.unwrap();
    manager
        .set_many([("retries", Value::Int(3)), ("mode", Value::from("fast"))])
        .await
        .unwrap();

    let reloaded = connect(&settings).await.unwrap();
    assert_eq!(reloaded.get_or("retries", 0).await.unwrap(), Value::Int(3));

    let cache: Arc<dyn CacheBackend> = Arc::new(
        RedisCache::new(&redis.redis_url, Some("econfig".to_string()), None)
            .await
            .unwrap(),
    );
    assert!(cache.get("econfig.component").await.unwrap().is_some());

    reloaded.delete_all().await.unwrap();
    assert!(cache.get("econfig.component").await.unwrap().is_none());
}
