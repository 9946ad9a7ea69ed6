pub mod manager;
pub mod postgres;
pub mod queries;
pub mod sqlite;
pub use manager::{DatabasePool, DatabaseType};
pub use postgres::PostgresConfigStore;
pub use sqlite::SqliteConfigStore;
