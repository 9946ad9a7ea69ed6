use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("编解码错误: {0}")]
    Codec(String),
    #[error("数据库错误: {0}")]
    Store(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    StoreOperation(String),
    #[error("缓存错误: {0}")]
    Cache(String),
}

pub type ConfigStoreResult<T> = Result<T, ConfigStoreError>;

impl ConfigStoreError {
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn codec_error<S: Into<String>>(msg: S) -> Self {
        Self::Codec(msg.into())
    }
    pub fn store_error<S: Into<String>>(msg: S) -> Self {
        Self::StoreOperation(msg.into())
    }
    pub fn cache_error<S: Into<String>>(msg: S) -> Self {
        Self::Cache(msg.into())
    }
    /// 配置类错误在任何调用点都不可恢复
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConfigStoreError::Configuration(_))
    }
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            ConfigStoreError::Store(_)
                | ConfigStoreError::StoreOperation(_)
                | ConfigStoreError::Cache(_)
        )
    }
}

impl From<serde_json::Error> for ConfigStoreError {
    fn from(err: serde_json::Error) -> Self {
        ConfigStoreError::Codec(err.to_string())
    }
}
