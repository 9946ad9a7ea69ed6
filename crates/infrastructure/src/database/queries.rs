//! SQL shared by the SQLite and PostgreSQL stores
//!
//! Both backends accept double-quoted identifiers and `$n` placeholders, so
//! one set of statements serves both. The table name is interpolated and is
//! therefore validated before any statement is built.

use econfig_core::settings::validate_table_name;
use econfig_errors::ConfigStoreResult;

/// Rows per multi-row statement, keeping bind parameters well below the
/// limits of both backends
pub const BATCH_SIZE: usize = 500;

fn quoted(table: &str) -> ConfigStoreResult<String> {
    validate_table_name(table)?;
    Ok(format!("\"{table}\""))
}

pub fn select_all(table: &str) -> ConfigStoreResult<String> {
    Ok(format!(
        "SELECT \"key\", \"value\" FROM {} ORDER BY \"key\"",
        quoted(table)?
    ))
}

pub fn insert(table: &str) -> ConfigStoreResult<String> {
    Ok(format!(
        "INSERT INTO {} (\"key\", \"value\") VALUES ($1, $2)",
        quoted(table)?
    ))
}

/// Prefix for a multi-row insert, completed with `QueryBuilder::push_values`
pub fn insert_prefix(table: &str) -> ConfigStoreResult<String> {
    Ok(format!("INSERT INTO {} (\"key\", \"value\") ", quoted(table)?))
}

pub fn update(table: &str) -> ConfigStoreResult<String> {
    Ok(format!(
        "UPDATE {} SET \"value\" = $2 WHERE \"key\" = $1",
        quoted(table)?
    ))
}

pub fn delete_by_key(table: &str) -> ConfigStoreResult<String> {
    Ok(format!("DELETE FROM {} WHERE \"key\" = $1", quoted(table)?))
}

/// Prefix for an `IN (...)` delete, completed with a separated bind list
pub fn delete_in_prefix(table: &str) -> ConfigStoreResult<String> {
    Ok(format!("DELETE FROM {} WHERE \"key\" IN (", quoted(table)?))
}

pub fn delete_all(table: &str) -> ConfigStoreResult<String> {
    Ok(format!("DELETE FROM {}", quoted(table)?))
}

pub fn create_table(table: &str) -> ConfigStoreResult<String> {
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\"key\" VARCHAR(255) NOT NULL PRIMARY KEY, \"value\" TEXT NOT NULL)",
        quoted(table)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use econfig_errors::ConfigStoreError;

    #[test]
    fn test_statements_quote_identifiers() {
        assert_eq!(
            select_all("configs").unwrap(),
            "SELECT \"key\", \"value\" FROM \"configs\" ORDER BY \"key\""
        );
        assert_eq!(
            update("configs").unwrap(),
            "UPDATE \"configs\" SET \"value\" = $2 WHERE \"key\" = $1"
        );
        assert_eq!(delete_all("app_settings").unwrap(), "DELETE FROM \"app_settings\"");
    }

    #[test]
    fn test_invalid_table_rejected() {
        let err = delete_all("configs\"; DROP TABLE users; --").unwrap_err();
        assert!(matches!(err, ConfigStoreError::Configuration(_)));
        assert!(create_table("").is_err());
    }
}
