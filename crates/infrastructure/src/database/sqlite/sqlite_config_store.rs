use async_trait::async_trait;
use econfig_core::traits::{ConfigEntry, ConfigStore};
use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::database::queries::{self, BATCH_SIZE};

pub struct SqliteConfigStore {
    pool: SqlitePool,
}

impl SqliteConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> ConfigStoreResult<ConfigEntry> {
        Ok(ConfigEntry {
            key: row.try_get("key")?,
            value: row.try_get("value")?,
        })
    }

    async fn insert_rows(
        conn: &mut SqliteConnection,
        table: &str,
        entries: &[ConfigEntry],
    ) -> ConfigStoreResult<()> {
        let prefix = queries::insert_prefix(table)?;
        for chunk in entries.chunks(BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(prefix.as_str());
            builder.push_values(chunk, |mut row, entry| {
                row.push_bind(entry.key.clone())
                    .push_bind(entry.value.clone());
            });
            builder
                .build()
                .execute(&mut *conn)
                .await
                .map_err(ConfigStoreError::Store)?;
        }
        Ok(())
    }

    async fn delete_rows(
        conn: &mut SqliteConnection,
        table: &str,
        keys: &[String],
    ) -> ConfigStoreResult<u64> {
        let prefix = queries::delete_in_prefix(table)?;
        let mut removed = 0;
        for chunk in keys.chunks(BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(prefix.as_str());
            let mut separated = builder.separated(", ");
            for key in chunk {
                separated.push_bind(key.clone());
            }
            separated.push_unseparated(")");
            removed += builder
                .build()
                .execute(&mut *conn)
                .await
                .map_err(ConfigStoreError::Store)?
                .rows_affected();
        }
        Ok(removed)
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn scan_all(&self, table: &str) -> ConfigStoreResult<Vec<ConfigEntry>> {
        let rows = sqlx::query(&queries::select_all(table)?)
            .fetch_all(&self.pool)
            .await
            .map_err(ConfigStoreError::Store)?;

        debug!("读取配置表 {} 共 {} 行", table, rows.len());
        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn insert(&self, table: &str, entry: &ConfigEntry) -> ConfigStoreResult<()> {
        sqlx::query(&queries::insert(table)?)
            .bind(&entry.key)
            .bind(&entry.value)
            .execute(&self.pool)
            .await
            .map_err(ConfigStoreError::Store)?;

        debug!("插入配置项成功: {}", entry.key);
        Ok(())
    }

    async fn insert_many(&self, table: &str, entries: &[ConfigEntry]) -> ConfigStoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(ConfigStoreError::Store)?;
        Self::insert_rows(&mut tx, table, entries).await?;
        tx.commit().await.map_err(ConfigStoreError::Store)?;

        debug!("批量插入配置项成功: {} 条", entries.len());
        Ok(())
    }

    async fn update(&self, table: &str, entry: &ConfigEntry) -> ConfigStoreResult<bool> {
        let result = sqlx::query(&queries::update(table)?)
            .bind(&entry.key)
            .bind(&entry.value)
            .execute(&self.pool)
            .await
            .map_err(ConfigStoreError::Store)?;

        debug!("更新配置项: {} (影响 {} 行)", entry.key, result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_key(&self, table: &str, key: &str) -> ConfigStoreResult<bool> {
        let result = sqlx::query(&queries::delete_by_key(table)?)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(ConfigStoreError::Store)?;

        debug!("删除配置项: {} (影响 {} 行)", key, result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_keys(&self, table: &str, keys: &[String]) -> ConfigStoreResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.acquire().await.map_err(ConfigStoreError::Store)?;
        let removed = Self::delete_rows(&mut conn, table, keys).await?;

        debug!("批量删除配置项: {} 条", removed);
        Ok(removed)
    }

    async fn delete_all(&self, table: &str) -> ConfigStoreResult<u64> {
        let result = sqlx::query(&queries::delete_all(table)?)
            .execute(&self.pool)
            .await
            .map_err(ConfigStoreError::Store)?;

        debug!("清空配置表 {}: {} 行", table, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn replace_many(&self, table: &str, entries: &[ConfigEntry]) -> ConfigStoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = entries.iter().map(|e| e.key.clone()).collect();

        let mut tx = self.pool.begin().await.map_err(ConfigStoreError::Store)?;
        Self::delete_rows(&mut tx, table, &keys).await?;
        Self::insert_rows(&mut tx, table, entries).await?;
        tx.commit().await.map_err(ConfigStoreError::Store)?;

        debug!("批量覆盖配置项成功: {} 条", entries.len());
        Ok(())
    }

    async fn ensure_table(&self, table: &str) -> ConfigStoreResult<()> {
        sqlx::query(&queries::create_table(table)?)
            .execute(&self.pool)
            .await
            .map_err(ConfigStoreError::Store)?;

        debug!("确认配置表存在: {}", table);
        Ok(())
    }
}
