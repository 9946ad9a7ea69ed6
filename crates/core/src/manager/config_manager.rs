//! Table-backed configuration manager
//!
//! The manager keeps every configuration entry in an in-memory snapshot and
//! mirrors each mutation into the backing table and, when configured, into a
//! cache blob holding the whole snapshot.
//!
//! Every operation holds the snapshot lock from start to finish, so the
//! snapshot, the table and the cache are updated as one critical section.
//! The snapshot is only touched after the store write has succeeded.

use std::collections::BTreeMap;
use std::sync::Arc;

use econfig_errors::ConfigStoreResult;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::codec::Coding;
use crate::manager::ConfigManagerBuilder;
use crate::merge::merge;
use crate::traits::{CacheBackend, ConfigEntry, ConfigStore};
use crate::value::Value;

/// Key to encoded value, mirroring the configuration table
pub type Snapshot = BTreeMap<String, String>;

pub struct ConfigManager {
    store: Arc<dyn ConfigStore>,
    cache: Option<Arc<dyn CacheBackend>>,
    table_name: String,
    cache_key: String,
    coding: Coding,
    snapshot: Mutex<Snapshot>,
}

impl ConfigManager {
    pub fn builder() -> ConfigManagerBuilder {
        ConfigManagerBuilder::new()
    }

    /// Load the snapshot and return a ready manager
    pub(crate) async fn initialize(
        store: Arc<dyn ConfigStore>,
        cache: Option<Arc<dyn CacheBackend>>,
        table_name: String,
        cache_key: String,
        coding: Coding,
    ) -> ConfigStoreResult<Self> {
        let manager = Self {
            store,
            cache,
            table_name,
            cache_key,
            coding,
            snapshot: Mutex::new(Snapshot::new()),
        };

        let snapshot = manager.load_snapshot().await?;
        *manager.snapshot.lock().await = snapshot;
        Ok(manager)
    }

    async fn load_snapshot(&self) -> ConfigStoreResult<Snapshot> {
        let mut snapshot = match &self.cache {
            Some(cache) => match cache.get(&self.cache_key).await? {
                Some(blob) => serde_json::from_slice::<Snapshot>(&blob).unwrap_or_else(|e| {
                    warn!(
                        "Cache blob under {} is not a snapshot mapping, ignoring it: {}",
                        self.cache_key, e
                    );
                    Snapshot::new()
                }),
                None => Snapshot::new(),
            },
            None => Snapshot::new(),
        };

        if !snapshot.is_empty() {
            info!(
                "Loaded {} config entries from cache key {}",
                snapshot.len(),
                self.cache_key
            );
            return Ok(snapshot);
        }

        let rows = self.store.scan_all(&self.table_name).await?;
        snapshot.extend(rows.into_iter().map(|entry| (entry.key, entry.value)));
        info!(
            "Loaded {} config entries from table {}",
            snapshot.len(),
            self.table_name
        );

        self.write_cache(&snapshot).await?;
        Ok(snapshot)
    }

    /// Rewrite the whole cache blob
    async fn write_cache(&self, snapshot: &Snapshot) -> ConfigStoreResult<()> {
        if let Some(cache) = &self.cache {
            let blob = serde_json::to_vec(snapshot)?;
            cache.set(&self.cache_key, &blob).await?;
            debug!("Rewrote cache blob {} ({} entries)", self.cache_key, snapshot.len());
        }
        Ok(())
    }

    /// Merge a map value into an existing map value, then encode
    fn merge_and_encode(
        &self,
        snapshot: &Snapshot,
        key: &str,
        value: Value,
    ) -> ConfigStoreResult<String> {
        let value = match snapshot.get(key) {
            Some(raw) if value.is_map() => merge(self.coding.decode(raw)?, value),
            _ => value,
        };
        self.coding.encode(&value)
    }

    fn decode_or(&self, snapshot: &Snapshot, key: &str, default: Value) -> ConfigStoreResult<Value> {
        match snapshot.get(key) {
            Some(raw) => self.coding.decode(raw),
            None => Ok(default),
        }
    }

    pub async fn get(&self, key: &str) -> ConfigStoreResult<Option<Value>> {
        let snapshot = self.snapshot.lock().await;
        snapshot.get(key).map(|raw| self.coding.decode(raw)).transpose()
    }

    /// Decoded value for `key`, or `default` unchanged when absent
    pub async fn get_or(&self, key: &str, default: impl Into<Value>) -> ConfigStoreResult<Value> {
        let snapshot = self.snapshot.lock().await;
        self.decode_or(&snapshot, key, default.into())
    }

    pub async fn has(&self, key: &str) -> bool {
        self.snapshot.lock().await.contains_key(key)
    }

    /// Resolve several keys sharing one default
    pub async fn get_many<I, K>(
        &self,
        keys: I,
        default: impl Into<Value>,
    ) -> ConfigStoreResult<BTreeMap<String, Value>>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let default = default.into();

        let snapshot = self.snapshot.lock().await;
        keys.into_iter()
            .map(|key| {
                self.decode_or(&snapshot, &key, default.clone())
                    .map(|value| (key, value))
            })
            .collect()
    }

    /// Resolve several keys, each with its own default
    pub async fn get_with_defaults<I, K, V>(
        &self,
        defaults: I,
    ) -> ConfigStoreResult<BTreeMap<String, Value>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let defaults: Vec<(String, Value)> = defaults
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let snapshot = self.snapshot.lock().await;
        defaults
            .into_iter()
            .map(|(key, default)| {
                self.decode_or(&snapshot, &key, default)
                    .map(|value| (key, value))
            })
            .collect()
    }

    /// Every entry, decoded one by one
    pub async fn get_all(&self) -> ConfigStoreResult<BTreeMap<String, Value>> {
        let snapshot = self.snapshot.lock().await;
        snapshot
            .iter()
            .map(|(key, raw)| self.coding.decode(raw).map(|value| (key.clone(), value)))
            .collect()
    }

    /// Write one entry
    ///
    /// A map value is merged into an existing map value. New keys are inserted,
    /// existing keys updated in place. A key known to the snapshot but missing
    /// from the table is inserted again.
    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: impl Into<Value>) -> ConfigStoreResult<()> {
        let value = value.into();
        let mut snapshot = self.snapshot.lock().await;

        let encoded = self.merge_and_encode(&snapshot, key, value)?;
        let entry = ConfigEntry::new(key, encoded);

        let known = snapshot.contains_key(key);
        let updated = if known {
            self.store.update(&self.table_name, &entry).await?
        } else {
            false
        };
        if !updated {
            if known {
                warn!(
                    "Config key {} is cached but missing from table {}, inserting it",
                    key, self.table_name
                );
            }
            self.store.insert(&self.table_name, &entry).await?;
        }
        debug!("Stored config key {}", key);

        snapshot.insert(entry.key, entry.value);
        self.write_cache(&snapshot).await
    }

    /// Write several entries at once
    ///
    /// Unlike [`ConfigManager::set`], the listed keys are deleted and
    /// re-inserted in one store operation, whether they existed or not. The
    /// cache blob is rewritten once for the whole batch.
    #[instrument(skip(self, entries))]
    pub async fn set_many<I, K, V>(&self, entries: I) -> ConfigStoreResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let entries: Vec<(String, Value)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if entries.is_empty() {
            return Ok(());
        }

        let mut snapshot = self.snapshot.lock().await;

        // Later duplicates of a key merge onto the earlier ones.
        let mut staged = Snapshot::new();
        for (key, value) in entries {
            let encoded = if staged.contains_key(&key) {
                self.merge_and_encode(&staged, &key, value)?
            } else {
                self.merge_and_encode(&snapshot, &key, value)?
            };
            staged.insert(key, encoded);
        }

        let rows: Vec<ConfigEntry> = staged
            .iter()
            .map(|(key, value)| ConfigEntry::new(key.as_str(), value.as_str()))
            .collect();
        self.store.replace_many(&self.table_name, &rows).await?;
        debug!("Replaced {} config keys", rows.len());

        snapshot.extend(staged);
        self.write_cache(&snapshot).await
    }

    /// Delete one entry; absent keys are a no-op returning `false`
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> ConfigStoreResult<bool> {
        let mut snapshot = self.snapshot.lock().await;
        if !snapshot.contains_key(key) {
            debug!("Config key {} not present, nothing to delete", key);
            return Ok(false);
        }

        self.store.delete_by_key(&self.table_name, key).await?;
        snapshot.remove(key);
        self.write_cache(&snapshot).await?;
        Ok(true)
    }

    /// Drop the cache entry, empty the table and reset the snapshot
    ///
    /// The cache entry goes first: a blob left behind would be loaded as the
    /// whole configuration by the next manager.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> ConfigStoreResult<()> {
        let mut snapshot = self.snapshot.lock().await;

        if let Some(cache) = &self.cache {
            cache.delete(&self.cache_key).await?;
        }
        let removed = self.store.delete_all(&self.table_name).await?;
        snapshot.clear();

        info!("Deleted all {} rows from table {}", removed, self.table_name);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.snapshot.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot.lock().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.snapshot.lock().await.keys().cloned().collect()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn coding(&self) -> Coding {
        self.coding
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }
}
