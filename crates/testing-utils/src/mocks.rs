//! Mock implementations of the store and cache backends
//!
//! Both mocks keep their data in memory, record every call so tests can
//! assert on the exact backend traffic, and can be switched into a failing
//! mode to exercise error propagation.

use async_trait::async_trait;
use econfig_core::traits::{CacheBackend, CacheStats, ConfigEntry, ConfigStore};
use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A call received by [`MockConfigStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ScanAll,
    Insert(String),
    InsertMany(Vec<String>),
    Update(String),
    DeleteByKey(String),
    DeleteByKeys(Vec<String>),
    DeleteAll,
    EnsureTable,
}

/// Mock implementation of ConfigStore for testing
#[derive(Debug, Clone, Default)]
pub struct MockConfigStore {
    rows: Arc<Mutex<BTreeMap<String, String>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows<K, V>(rows: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store
            .rows
            .lock()
            .unwrap()
            .extend(rows.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    /// Make every write fail with a store error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> BTreeMap<String, String> {
        self.rows.lock().unwrap().clone()
    }

    pub fn row(&self, key: &str) -> Option<String> {
        self.rows.lock().unwrap().get(key).cloned()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn scan_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::ScanAll))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_writable(&self) -> ConfigStoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConfigStoreError::store_error("mock store write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn scan_all(&self, _table: &str) -> ConfigStoreResult<Vec<ConfigEntry>> {
        self.record(StoreCall::ScanAll);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .map(|(k, v)| ConfigEntry::new(k.as_str(), v.as_str()))
            .collect())
    }

    async fn insert(&self, _table: &str, entry: &ConfigEntry) -> ConfigStoreResult<()> {
        self.record(StoreCall::Insert(entry.key.clone()));
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&entry.key) {
            return Err(ConfigStoreError::store_error(format!(
                "duplicate key {}",
                entry.key
            )));
        }
        rows.insert(entry.key.clone(), entry.value.clone());
        Ok(())
    }

    async fn insert_many(&self, _table: &str, entries: &[ConfigEntry]) -> ConfigStoreResult<()> {
        self.record(StoreCall::InsertMany(
            entries.iter().map(|e| e.key.clone()).collect(),
        ));
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(dup) = entries.iter().find(|e| rows.contains_key(&e.key)) {
            return Err(ConfigStoreError::store_error(format!(
                "duplicate key {}",
                dup.key
            )));
        }
        for entry in entries {
            rows.insert(entry.key.clone(), entry.value.clone());
        }
        Ok(())
    }

    async fn update(&self, _table: &str, entry: &ConfigEntry) -> ConfigStoreResult<bool> {
        self.record(StoreCall::Update(entry.key.clone()));
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&entry.key) {
            Some(value) => {
                *value = entry.value.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_key(&self, _table: &str, key: &str) -> ConfigStoreResult<bool> {
        self.record(StoreCall::DeleteByKey(key.to_string()));
        self.check_writable()?;
        Ok(self.rows.lock().unwrap().remove(key).is_some())
    }

    async fn delete_by_keys(&self, _table: &str, keys: &[String]) -> ConfigStoreResult<u64> {
        self.record(StoreCall::DeleteByKeys(keys.to_vec()));
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(keys.iter().filter(|k| rows.remove(*k).is_some()).count() as u64)
    }

    async fn delete_all(&self, _table: &str) -> ConfigStoreResult<u64> {
        self.record(StoreCall::DeleteAll);
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }

    async fn ensure_table(&self, _table: &str) -> ConfigStoreResult<()> {
        self.record(StoreCall::EnsureTable);
        Ok(())
    }
}

/// A call received by [`MockCacheBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    Get(String),
    Set(String),
    Delete(String),
}

/// Mock implementation of CacheBackend for testing
#[derive(Debug, Clone, Default)]
pub struct MockCacheBackend {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<Mutex<Vec<CacheCall>>>,
    fail: Arc<AtomicBool>,
}

impl MockCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a raw blob
    pub fn seed(&self, key: &str, blob: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), blob.into());
    }

    /// Make every call fail with a cache error
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Decode the snapshot blob stored under `key`
    pub fn snapshot(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.raw(key)
            .and_then(|blob| serde_json::from_slice(&blob).ok())
    }

    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CacheCall::Set(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: CacheCall) -> ConfigStoreResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConfigStoreError::cache_error("mock cache failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for MockCacheBackend {
    async fn get(&self, key: &str) -> ConfigStoreResult<Option<Vec<u8>>> {
        self.record(CacheCall::Get(key.to_string()))?;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &[u8]) -> ConfigStoreResult<()> {
        self.record(CacheCall::Set(key.to_string()))?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> ConfigStoreResult<bool> {
        self.record(CacheCall::Delete(key.to_string()))?;
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    async fn stats(&self) -> CacheStats {
        let calls = self.calls();
        CacheStats {
            sets: calls.iter().filter(|c| matches!(c, CacheCall::Set(_))).count() as u64,
            deletes: calls
                .iter()
                .filter(|c| matches!(c, CacheCall::Delete(_)))
                .count() as u64,
            ..Default::default()
        }
    }
}
