//! Test helper utilities
//!
//! One-call construction of a [`ConfigManager`] over the mock backends.

use std::sync::Arc;

use econfig_core::{ConfigManager, ConfigStoreResult};

use crate::mocks::{MockCacheBackend, MockConfigStore};

/// A manager together with handles to the mocks it writes through
pub struct MockedManager {
    pub manager: ConfigManager,
    pub store: MockConfigStore,
    pub cache: MockCacheBackend,
}

impl MockedManager {
    /// Manager over an empty store and an empty cache
    pub async fn new(coding: &str) -> ConfigStoreResult<Self> {
        Self::with_backends(MockConfigStore::new(), MockCacheBackend::new(), coding).await
    }

    pub async fn with_backends(
        store: MockConfigStore,
        cache: MockCacheBackend,
        coding: &str,
    ) -> ConfigStoreResult<Self> {
        let manager = ConfigManager::builder()
            .store(Arc::new(store.clone()))
            .cache(Arc::new(cache.clone()))
            .coding(coding)
            .build()
            .await?;

        Ok(Self {
            manager,
            store,
            cache,
        })
    }

    /// Manager over the given store without any cache
    pub async fn without_cache(store: MockConfigStore, coding: &str) -> ConfigStoreResult<ConfigManager> {
        ConfigManager::builder()
            .store(Arc::new(store))
            .coding(coding)
            .build()
            .await
    }
}
