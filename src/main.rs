use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use econfig::cli::{execute, parse_value, CliCommand};
use econfig::{connect, ConfigStoreSettings};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn build_cli() -> Command {
    let key = || Arg::new("key").value_name("KEY").help("配置键").required(true);

    Command::new("econfig")
        .version("1.0.0")
        .about("数据库表驱动的键值配置存储")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("配置文件路径"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .global(true)
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .default_value("warn"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .global(true)
                .help("日志格式")
                .value_parser(["json", "pretty"])
                .default_value("pretty"),
        )
        .subcommand(Command::new("get").about("读取配置项").arg(key()))
        .subcommand(
            Command::new("set")
                .about("写入配置项，值为JSON")
                .arg(key())
                .arg(Arg::new("value").value_name("JSON").required(true)),
        )
        .subcommand(Command::new("delete").about("删除配置项").arg(key()))
        .subcommand(Command::new("list").about("列出全部配置项"))
        .subcommand(Command::new("clear").about("清空配置表和缓存"))
}

fn parse_command(matches: &ArgMatches) -> Result<CliCommand> {
    let arg = |sub: &ArgMatches, name: &str| -> Result<String> {
        sub.get_one::<String>(name)
            .cloned()
            .with_context(|| format!("缺少参数: {name}"))
    };

    match matches.subcommand() {
        Some(("get", sub)) => Ok(CliCommand::Get { key: arg(sub, "key")? }),
        Some(("set", sub)) => Ok(CliCommand::Set {
            key: arg(sub, "key")?,
            value: parse_value(&arg(sub, "value")?),
        }),
        Some(("delete", sub)) => Ok(CliCommand::Delete { key: arg(sub, "key")? }),
        Some(("list", _)) => Ok(CliCommand::List),
        Some(("clear", _)) => Ok(CliCommand::Clear),
        _ => Err(anyhow::anyhow!("未知的子命令")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let config_path = matches.get_one::<String>("config");
    let log_level = matches
        .get_one::<String>("log-level")
        .map_or("warn", String::as_str);
    let log_format = matches
        .get_one::<String>("log-format")
        .map_or("pretty", String::as_str);

    init_logging(log_level, log_format)?;

    let settings = ConfigStoreSettings::load(config_path.map(String::as_str))
        .context("加载配置失败")?;
    info!("数据库: {}, 配置表: {}", settings.database_url, settings.table_name);

    let command = parse_command(&matches)?;
    let manager = connect(&settings).await.context("连接配置存储失败")?;

    let output = execute(&manager, command).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// 初始化日志系统，日志输出到stderr
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_parse_set_command() {
        let matches = build_cli()
            .try_get_matches_from(["econfig", "--log-format", "json", "set", "retries", "3"])
            .unwrap();
        assert_eq!(
            parse_command(&matches).unwrap(),
            CliCommand::Set {
                key: "retries".to_string(),
                value: econfig::Value::Int(3),
            }
        );
    }

    #[test]
    fn test_parse_list_with_config() {
        let matches = build_cli()
            .try_get_matches_from(["econfig", "--config", "econfig.toml", "list"])
            .unwrap();
        assert_eq!(parse_command(&matches).unwrap(), CliCommand::List);
        assert_eq!(
            matches.get_one::<String>("config").map(String::as_str),
            Some("econfig.toml")
        );
    }
}
