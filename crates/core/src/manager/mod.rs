mod builder;
mod config_manager;

pub use builder::ConfigManagerBuilder;
pub use config_manager::{ConfigManager, Snapshot};
