use std::str::FromStr;
use std::sync::Arc;

use econfig_core::traits::ConfigStore;
use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use sqlx::sqlite::SqliteConnectOptions;
use tracing::info;

use super::postgres::PostgresConfigStore;
use super::sqlite::SqliteConfigStore;

/// Database type detection
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseType::PostgreSQL
        } else {
            DatabaseType::SQLite
        }
    }
}

/// An in-memory SQLite database lives and dies with its connection
fn is_sqlite_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Database connection pool
#[derive(Clone)]
pub enum DatabasePool {
    PostgreSQL(sqlx::PgPool),
    SQLite(sqlx::SqlitePool),
}

impl DatabasePool {
    /// Create pool from URL with automatic type detection
    pub async fn new(url: &str, max_connections: u32) -> ConfigStoreResult<Self> {
        match DatabaseType::from_url(url) {
            DatabaseType::PostgreSQL => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(max_connections)
                    .connect(url)
                    .await
                    .map_err(ConfigStoreError::Store)?;
                info!("已连接PostgreSQL数据库");
                Ok(DatabasePool::PostgreSQL(pool))
            }
            DatabaseType::SQLite => {
                let options = SqliteConnectOptions::from_str(url)
                    .map_err(|e| ConfigStoreError::config_error(format!("无效的SQLite URL {url}: {e}")))?
                    .create_if_missing(true);

                let mut pool_options = sqlx::sqlite::SqlitePoolOptions::new();
                if is_sqlite_memory(url) {
                    pool_options = pool_options
                        .max_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                } else {
                    pool_options = pool_options.max_connections(max_connections);
                }

                let pool = pool_options
                    .connect_with(options)
                    .await
                    .map_err(ConfigStoreError::Store)?;
                info!("已连接SQLite数据库: {}", url);
                Ok(DatabasePool::SQLite(pool))
            }
        }
    }

    pub fn database_type(&self) -> DatabaseType {
        match self {
            DatabasePool::PostgreSQL(_) => DatabaseType::PostgreSQL,
            DatabasePool::SQLite(_) => DatabaseType::SQLite,
        }
    }

    pub async fn health_check(&self) -> ConfigStoreResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(ConfigStoreError::Store)?;
            }
            DatabasePool::SQLite(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(ConfigStoreError::Store)?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match self {
            DatabasePool::PostgreSQL(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
        }
    }

    /// Store over this pool for the matching backend
    pub fn config_store(&self) -> Arc<dyn ConfigStore> {
        match self {
            DatabasePool::PostgreSQL(pool) => Arc::new(PostgresConfigStore::new(pool.clone())),
            DatabasePool::SQLite(pool) => Arc::new(SqliteConfigStore::new(pool.clone())),
        }
    }
}
