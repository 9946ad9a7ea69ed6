//! Builder for [`ConfigManager`]
//!
//! All wiring is validated before the snapshot is loaded.

use std::sync::Arc;

use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use tracing::debug;

use crate::codec::Coding;
use crate::manager::ConfigManager;
use crate::settings::{
    validate_cache_key, validate_table_name, ConfigStoreSettings, DEFAULT_CACHE_KEY,
    DEFAULT_TABLE_NAME,
};
use crate::traits::{CacheBackend, ConfigStore};

pub struct ConfigManagerBuilder {
    store: Option<Arc<dyn ConfigStore>>,
    cache: Option<Arc<dyn CacheBackend>>,
    table_name: String,
    cache_key: String,
    coding: String,
    create_table: bool,
}

impl ConfigManagerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            cache: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            coding: Coding::default().as_str().to_string(),
            create_table: false,
        }
    }

    /// Take table name, cache key, coding and table creation from settings
    pub fn with_settings(mut self, settings: &ConfigStoreSettings) -> Self {
        self.table_name = settings.table_name.clone();
        self.cache_key = settings.cache_key.clone();
        self.coding = settings.coding.clone();
        self.create_table = settings.create_table;
        self
    }

    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn maybe_cache(mut self, cache: Option<Arc<dyn CacheBackend>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    /// Coding by name, `serialize` or `json`
    pub fn coding(mut self, coding: impl Into<String>) -> Self {
        self.coding = coding.into();
        self
    }

    /// Create the table before loading when it does not exist yet
    pub fn create_table(mut self, create_table: bool) -> Self {
        self.create_table = create_table;
        self
    }

    pub async fn build(self) -> ConfigStoreResult<ConfigManager> {
        let store = self
            .store
            .ok_or_else(|| ConfigStoreError::config_error("store handle is not configured"))?;
        validate_table_name(&self.table_name)?;
        validate_cache_key(&self.cache_key)?;
        let coding: Coding = self.coding.parse()?;

        if self.create_table {
            store.ensure_table(&self.table_name).await?;
        }

        debug!(
            "Building config manager for table {} (coding {}, cache {})",
            self.table_name,
            coding,
            if self.cache.is_some() { "on" } else { "off" }
        );

        ConfigManager::initialize(store, self.cache, self.table_name, self.cache_key, coding).await
    }
}

impl Default for ConfigManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_without_store_fails() {
        let err = ConfigManagerBuilder::new().build().await.err().unwrap();
        assert!(matches!(err, ConfigStoreError::Configuration(_)));
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ConfigManagerBuilder::default();
        assert_eq!(builder.table_name, "configs");
        assert_eq!(builder.cache_key, "econfig.component");
        assert_eq!(builder.coding, "serialize");
        assert!(!builder.create_table);
    }

    #[test]
    fn test_with_settings() {
        let settings = ConfigStoreSettings {
            table_name: "app_settings".to_string(),
            cache_key: "app.settings".to_string(),
            coding: "json".to_string(),
            ..Default::default()
        };
        let builder = ConfigManagerBuilder::new().with_settings(&settings);
        assert_eq!(builder.table_name, "app_settings");
        assert_eq!(builder.cache_key, "app.settings");
        assert_eq!(builder.coding, "json");
        assert!(builder.create_table);
    }
}
