//! Commands of the `econfig` binary

use anyhow::{anyhow, Context, Result};
use econfig_core::{ConfigManager, Value};

/// A parsed subcommand
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Get { key: String },
    Set { key: String, value: Value },
    Delete { key: String },
    List,
    Clear,
}

/// Values on the command line are JSON; bare words are taken as strings
pub fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from(json),
        Err(_) => Value::from(raw),
    }
}

pub fn render_value(value: &Value) -> Result<String> {
    let json = serde_json::Value::try_from(value).map_err(|e| anyhow!("无法输出为JSON: {e}"))?;
    Ok(json.to_string())
}

/// Run one command, returning the text to print
pub async fn execute(manager: &ConfigManager, command: CliCommand) -> Result<String> {
    match command {
        CliCommand::Get { key } => match manager.get(&key).await? {
            Some(value) => render_value(&value),
            None => Err(anyhow!("配置项不存在: {key}")),
        },
        CliCommand::Set { key, value } => {
            manager
                .set(&key, value)
                .await
                .with_context(|| format!("写入配置项失败: {key}"))?;
            Ok(format!("已写入 {key}"))
        }
        CliCommand::Delete { key } => {
            if manager.delete(&key).await? {
                Ok(format!("已删除 {key}"))
            } else {
                Ok(format!("配置项不存在: {key}"))
            }
        }
        CliCommand::List => {
            let mut lines = Vec::new();
            for (key, value) in manager.get_all().await? {
                lines.push(format!("{key} = {}", render_value(&value)?));
            }
            Ok(lines.join("\n"))
        }
        CliCommand::Clear => {
            let count = manager.len().await;
            manager.delete_all().await?;
            Ok(format!("已清空 {count} 个配置项"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("3"), Value::Int(3));
        assert_eq!(parse_value("\"fast\""), Value::from("fast"));
        assert_eq!(parse_value("fast"), Value::from("fast"));
        assert_eq!(
            parse_value(r#"{"host":"localhost"}"#),
            Value::map([("host", "localhost")])
        );
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Int(3)).unwrap(), "3");
        assert_eq!(
            render_value(&Value::map([("a", true)])).unwrap(),
            r#"{"a":true}"#
        );
        assert!(render_value(&Value::Float(f64::NAN)).is_err());
    }
}
