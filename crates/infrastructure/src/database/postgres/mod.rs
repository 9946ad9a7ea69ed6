pub mod postgres_config_store;

pub use postgres_config_store::PostgresConfigStore;
