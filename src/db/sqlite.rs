//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient`
//! trait for SQLite database files using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, Dataset, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use std::time::{Duration, Instant};
use tracing::debug;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens a SQLite database file using the given configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        debug!("Opening {}", config.display_string());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        Ok(Self { pool })
    }

    /// Creates a new SqliteClient from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    #[allow(dead_code)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&self, sql: &str) -> Result<Dataset> {
        let start = Instant::now();

        let result = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ReportError::query(format_query_error(e)))?;

        let elapsed = start.elapsed();

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|first_row| {
                first_row
                    .columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        Ok(Dataset {
            columns,
            rows,
            elapsed,
        })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a SqliteRow to our Value type.
fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INTEGER" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "NUMERIC" | "DOUBLE" | "FLOAT" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT, DATE, DATETIME, and everything else as string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ReportError {
    let path = config
        .path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("unable to open") || error_str.contains("no such file") {
        ReportError::connection(format!(
            "Cannot open database file '{path}'. Check that the file exists."
        ))
    } else {
        ReportError::connection(error.to_string())
    }
}

/// Formats a query error, preferring the database's own message.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn memory_client() -> SqliteClient {
        let config = ConnectionConfig {
            backend: crate::db::DatabaseBackend::Sqlite,
            path: Some(PathBuf::from(":memory:")),
            ..Default::default()
        };
        SqliteClient::connect(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_execute_select_query() {
        let client = memory_client().await;

        let dataset = client
            .execute_query("SELECT 1 as num, 'hello' as greeting")
            .await
            .unwrap();

        assert_eq!(dataset.columns.len(), 2);
        assert_eq!(dataset.columns[0].name, "num");
        assert_eq!(dataset.columns[1].name, "greeting");
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(dataset.rows[0][0], Value::Int(1));
        assert_eq!(dataset.rows[0][1], Value::Text("hello".to_string()));

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_query_with_error() {
        let client = memory_client().await;

        let result = client.execute_query("SELECT * FROM missing_table").await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ReportError::Query(_)));

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_null_values() {
        let client = memory_client().await;

        let dataset = client
            .execute_query("SELECT NULL as nothing, 2.5 as ratio")
            .await
            .unwrap();

        assert!(dataset.rows[0][0].is_null());
        assert_eq!(dataset.rows[0][1], Value::Float(2.5));

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_error() {
        let config = ConnectionConfig {
            backend: crate::db::DatabaseBackend::Sqlite,
            path: Some(PathBuf::from("/nonexistent/dir/missing.db")),
            ..Default::default()
        };

        let result = SqliteClient::connect(&config).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ReportError::Connection(_)));
    }
}
