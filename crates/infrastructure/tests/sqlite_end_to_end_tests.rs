//! End-to-end tests over SQLite and the in-memory cache

use std::sync::Arc;

use econfig_core::traits::CacheBackend;
use econfig_core::{ConfigManager, ConfigStoreSettings, Value};
use econfig_infrastructure::{connect, DatabasePool, InMemoryCache};

fn file_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite:{}", dir.path().join("econfig.db").display())
}

async fn file_manager(
    pool: &DatabasePool,
    cache: Option<Arc<dyn CacheBackend>>,
    coding: &str,
) -> ConfigManager {
    ConfigManager::builder()
        .store(pool.config_store())
        .maybe_cache(cache)
        .coding(coding)
        .create_table(true)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_connect_with_defaults() {
    let settings = ConfigStoreSettings {
        cache_url: Some("memory://".to_string()),
        coding: "json".to_string(),
        ..Default::default()
    };
    let manager = connect(&settings).await.unwrap();
    assert!(manager.is_empty().await);
    assert!(manager.has_cache());

    manager.set("retries", 3).await.unwrap();
    assert_eq!(manager.get_or("retries", 0).await.unwrap(), Value::Int(3));
    assert!(manager.has("retries").await);

    assert!(manager.delete("retries").await.unwrap());
    assert!(!manager.delete("retries").await.unwrap());
    assert_eq!(manager.get_or("retries", 0).await.unwrap(), Value::Int(0));
}

#[tokio::test]
async fn test_values_persist_across_managers() {
    let dir = tempfile::tempdir().unwrap();
    let pool = DatabasePool::new(&file_url(&dir), 2).await.unwrap();

    let first = file_manager(&pool, None, "serialize").await;
    first
        .set("db", Value::map([("host", "localhost"), ("port", "5432")]))
        .await
        .unwrap();
    first
        .set_many([("a", Value::Int(1)), ("b", Value::from("two"))])
        .await
        .unwrap();

    let second = file_manager(&pool, None, "serialize").await;
    assert_eq!(second.len().await, 3);
    assert_eq!(second.get_or("b", Value::Null).await.unwrap(), Value::from("two"));
    let db = second.get("db").await.unwrap().unwrap();
    assert_eq!(db.get("port"), Some(&Value::from("5432")));
}

#[tokio::test]
async fn test_map_merge_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let pool = DatabasePool::new(&file_url(&dir), 2).await.unwrap();
    let manager = file_manager(&pool, None, "serialize").await;

    manager
        .set("k", Value::map([("a", 1), ("b", 2)]))
        .await
        .unwrap();
    manager
        .set("k", Value::map([("b", 3), ("c", 4)]))
        .await
        .unwrap();

    let reloaded = file_manager(&pool, None, "serialize").await;
    assert_eq!(
        reloaded.get("k").await.unwrap(),
        Some(Value::map([("a", 1), ("b", 3), ("c", 4)]))
    );
}

#[tokio::test]
async fn test_shared_cache_is_read_before_table() {
    let dir = tempfile::tempdir().unwrap();
    let pool = DatabasePool::new(&file_url(&dir), 2).await.unwrap();
    let cache: Arc<dyn CacheBackend> = Arc::new(InMemoryCache::new());

    let writer = file_manager(&pool, Some(cache.clone()), "json").await;
    writer.set("feature", true).await.unwrap();

    // Rows removed behind the manager's back stay visible through the cache.
    pool.config_store().delete_all("configs").await.unwrap();

    let reader = file_manager(&pool, Some(cache.clone()), "json").await;
    assert_eq!(reader.get("feature").await.unwrap(), Some(Value::Bool(true)));

    // Writing a key the table lost puts the row back.
    reader.set("feature", false).await.unwrap();
    let rows = pool.config_store().scan_all("configs").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, "false");

    reader.delete_all().await.unwrap();
    assert_eq!(cache.get("econfig.component").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_many_replaces_existing_rows() {
    let settings = ConfigStoreSettings::default();
    let manager = connect(&settings).await.unwrap();

    manager.set("a", "old").await.unwrap();
    manager
        .set_many([("a", "new"), ("b", "fresh")])
        .await
        .unwrap();

    let all = manager.get_all().await.unwrap();
    assert_eq!(all.get("a"), Some(&Value::from("new")));
    assert_eq!(all.get("b"), Some(&Value::from("fresh")));
    assert_eq!(manager.keys().await, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_custom_table_name() {
    let settings = ConfigStoreSettings {
        table_name: "app_settings".to_string(),
        ..Default::default()
    };
    let manager = connect(&settings).await.unwrap();
    assert_eq!(manager.table_name(), "app_settings");

    manager.set("x", 1).await.unwrap();
    assert_eq!(manager.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_settings_fail_before_connecting() {
    let settings = ConfigStoreSettings {
        coding: "yaml".to_string(),
        ..Default::default()
    };
    let err = connect(&settings).await.err().unwrap();
    assert!(err.is_fatal());
}
