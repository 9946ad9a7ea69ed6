//! 配置表存储接口定义
//!
//! 配置表只有两列：`key`（主键）和 `value`（编码后的文本）。
//! 存储层不解析 `value`，编解码由 [`crate::codec::Coding`] 负责。
//!
//! ## 使用示例
//!
//! ```ignore
//! use econfig_core::traits::{ConfigEntry, ConfigStore};
//!
//! async fn seed(store: &dyn ConfigStore) -> ConfigStoreResult<()> {
//!     store.ensure_table("configs").await?;
//!     store
//!         .insert_many("configs", &[ConfigEntry::new("retries", "3")])
//!         .await?;
//!     let rows = store.scan_all("configs").await?;
//!     println!("配置项数量: {}", rows.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use econfig_errors::ConfigStoreResult;
use serde::{Deserialize, Serialize};

/// 配置表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 配置表存储抽象
///
/// 所有操作按表名寻址，表名由调用方在初始化时校验。
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 读取整张表
    async fn scan_all(&self, table: &str) -> ConfigStoreResult<Vec<ConfigEntry>>;

    async fn insert(&self, table: &str, entry: &ConfigEntry) -> ConfigStoreResult<()>;

    async fn insert_many(&self, table: &str, entries: &[ConfigEntry]) -> ConfigStoreResult<()>;

    /// 按键更新，返回是否命中
    async fn update(&self, table: &str, entry: &ConfigEntry) -> ConfigStoreResult<bool>;

    async fn delete_by_key(&self, table: &str, key: &str) -> ConfigStoreResult<bool>;

    async fn delete_by_keys(&self, table: &str, keys: &[String]) -> ConfigStoreResult<u64>;

    async fn delete_all(&self, table: &str) -> ConfigStoreResult<u64>;

    /// 先删后插的批量覆盖写入
    ///
    /// 默认实现依次调用 `delete_by_keys` 和 `insert_many`，数据库实现应在单个事务内完成。
    async fn replace_many(&self, table: &str, entries: &[ConfigEntry]) -> ConfigStoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = entries.iter().map(|e| e.key.clone()).collect();
        self.delete_by_keys(table, &keys).await?;
        self.insert_many(table, entries).await
    }

    /// 表不存在时创建
    async fn ensure_table(&self, table: &str) -> ConfigStoreResult<()>;
}
