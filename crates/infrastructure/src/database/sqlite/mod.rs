pub mod sqlite_config_store;

pub use sqlite_config_store::SqliteConfigStore;
