use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use econfig_errors::{ConfigStoreError, ConfigStoreResult};
use serde::{Deserialize, Serialize};

use crate::codec::Coding;

pub const DEFAULT_CACHE_KEY: &str = "econfig.component";
pub const DEFAULT_TABLE_NAME: &str = "configs";
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// 配置存储的接线参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigStoreSettings {
    /// 数据库连接URL，`sqlite:` 或 `postgres://`
    pub database_url: String,
    /// 连接池最大连接数
    pub max_connections: u32,
    /// 缓存URL，`redis://` 或 `memory://`，为空表示不使用缓存
    pub cache_url: Option<String>,
    /// Redis键前缀
    pub cache_key_prefix: Option<String>,
    /// 缓存过期时间（秒），为空表示永不过期
    pub cache_ttl_seconds: Option<u64>,
    /// 快照在缓存中的键
    pub cache_key: String,
    /// 配置表名
    pub table_name: String,
    /// 编码方式：serialize 或 json
    pub coding: String,
    /// 启动时自动建表
    pub create_table: bool,
}

impl Default for ConfigStoreSettings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            cache_url: None,
            cache_key_prefix: None,
            cache_ttl_seconds: None,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            coding: Coding::default().as_str().to_string(),
            create_table: true,
        }
    }
}

impl ConfigStoreSettings {
    /// 加载顺序：默认值 -> TOML文件 -> `ECONFIG_*` 环境变量
    pub fn load(config_path: Option<&str>) -> ConfigStoreResult<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("database_url", defaults.database_url)
            .and_then(|b| b.set_default("max_connections", i64::from(defaults.max_connections)))
            .and_then(|b| b.set_default("cache_key", defaults.cache_key))
            .and_then(|b| b.set_default("table_name", defaults.table_name))
            .and_then(|b| b.set_default("coding", defaults.coding))
            .and_then(|b| b.set_default("create_table", defaults.create_table))
            .map_err(|e| ConfigStoreError::config_error(format!("设置默认配置失败: {e}")))?;

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(ConfigStoreError::config_error(format!(
                    "配置文件不存在: {path}"
                )));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(Environment::with_prefix("ECONFIG").try_parsing(true));

        let settings: ConfigStoreSettings = builder
            .build()
            .map_err(|e| ConfigStoreError::config_error(format!("构建配置失败: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigStoreError::config_error(format!("反序列化配置失败: {e}")))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(toml_str: &str) -> ConfigStoreResult<Self> {
        let settings: ConfigStoreSettings = toml::from_str(toml_str)
            .map_err(|e| ConfigStoreError::config_error(format!("解析TOML配置失败: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> ConfigStoreResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigStoreError::config_error(format!("序列化配置为TOML失败: {e}")))
    }

    pub fn coding(&self) -> ConfigStoreResult<Coding> {
        self.coding.parse()
    }

    pub fn validate(&self) -> ConfigStoreResult<()> {
        if self.database_url.is_empty() {
            return Err(ConfigStoreError::config_error("数据库URL不能为空"));
        }
        if self.max_connections == 0 {
            return Err(ConfigStoreError::config_error("最大连接数必须大于0"));
        }
        if matches!(&self.cache_url, Some(url) if url.is_empty()) {
            return Err(ConfigStoreError::config_error("缓存URL不能为空字符串"));
        }
        if self.cache_ttl_seconds == Some(0) {
            return Err(ConfigStoreError::config_error("缓存过期时间必须大于0"));
        }
        validate_cache_key(&self.cache_key)?;
        validate_table_name(&self.table_name)?;
        self.coding()?;
        Ok(())
    }
}

/// 表名会被拼进SQL，只允许普通标识符
pub fn validate_table_name(table_name: &str) -> ConfigStoreResult<()> {
    let mut chars = table_name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            table_name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigStoreError::config_error(format!(
            "表名 \"{table_name}\" 无效"
        )))
    }
}

pub fn validate_cache_key(cache_key: &str) -> ConfigStoreResult<()> {
    if cache_key.trim().is_empty() {
        return Err(ConfigStoreError::config_error("缓存键不能为空"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = ConfigStoreSettings::default();
        assert_eq!(settings.cache_key, "econfig.component");
        assert_eq!(settings.table_name, "configs");
        assert_eq!(settings.coding, "serialize");
        assert_eq!(settings.cache_url, None);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.coding().unwrap(), Coding::Serialize);
    }

    #[test]
    fn test_from_toml_fills_defaults() {
        let settings = ConfigStoreSettings::from_toml(
            r#"
            database_url = "sqlite:app.db"
            cache_url = "memory://"
            coding = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.database_url, "sqlite:app.db");
        assert_eq!(settings.cache_url.as_deref(), Some("memory://"));
        assert_eq!(settings.coding().unwrap(), Coding::Json);
        assert_eq!(settings.table_name, "configs");
        assert_eq!(settings.cache_key, "econfig.component");
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = ConfigStoreSettings {
            cache_url: Some("redis://localhost:6379".to_string()),
            cache_ttl_seconds: Some(600),
            ..Default::default()
        };
        let text = settings.to_toml().unwrap();
        assert_eq!(ConfigStoreSettings::from_toml(&text).unwrap(), settings);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let cases = [
            ConfigStoreSettings {
                coding: "xml".to_string(),
                ..Default::default()
            },
            ConfigStoreSettings {
                table_name: "configs; DROP TABLE users".to_string(),
                ..Default::default()
            },
            ConfigStoreSettings {
                cache_key: "  ".to_string(),
                ..Default::default()
            },
            ConfigStoreSettings {
                max_connections: 0,
                ..Default::default()
            },
            ConfigStoreSettings {
                cache_ttl_seconds: Some(0),
                ..Default::default()
            },
            ConfigStoreSettings {
                cache_url: Some(String::new()),
                ..Default::default()
            },
        ];

        for settings in cases {
            let err = settings.validate().unwrap_err();
            assert!(matches!(err, ConfigStoreError::Configuration(_)), "{settings:?}");
        }
    }

    #[test]
    fn test_table_name_validation() {
        assert!(validate_table_name("configs").is_ok());
        assert!(validate_table_name("_app_configs_2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2configs").is_err());
        assert!(validate_table_name("app.configs").is_err());
        assert!(validate_table_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "table_name = \"app_settings\"\ncoding = \"json\"").unwrap();

        let settings = ConfigStoreSettings::load(file.path().to_str()).unwrap();
        assert_eq!(settings.table_name, "app_settings");
        assert_eq!(settings.coding, "json");
        assert_eq!(settings.max_connections, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigStoreSettings::load(Some("/nonexistent/econfig.toml")).unwrap_err();
        assert!(matches!(err, ConfigStoreError::Configuration(_)));
    }
}
