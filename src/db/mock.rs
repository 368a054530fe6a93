//! Mock database clients for testing.
//!
//! Provides in-memory implementations for exercising report runs without a
//! real database.

use super::{ColumnInfo, DatabaseClient, Dataset, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A mock database client that returns predefined results.
pub struct MockDatabaseClient {
    dataset: Option<Dataset>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with generated results.
    pub fn new() -> Self {
        Self { dataset: None }
    }

    /// Creates a mock client that returns the given dataset for every query.
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Some(dataset),
        }
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<Dataset> {
        if let Some(dataset) = &self.dataset {
            return Ok(dataset.clone());
        }

        let sql_upper = sql.to_uppercase();

        if sql_upper.starts_with("SELECT") {
            // Return a simple result with one row
            let columns = vec![ColumnInfo::new("result", "text")];
            let rows = vec![vec![Value::Text(format!("Mock result for: {}", sql))]];

            Ok(Dataset::with_data(columns, rows).with_elapsed(Duration::from_millis(1)))
        } else {
            // For non-SELECT queries, return empty result
            Ok(Dataset::new().with_elapsed(Duration::from_millis(1)))
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A mock database client whose queries always fail.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client with a default error message.
    pub fn new() -> Self {
        Self::with_message("mock query failure")
    }

    /// Creates a failing client with the given error message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<Dataset> {
        Err(ReportError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_select() {
        let client = MockDatabaseClient::new();
        let dataset = client.execute_query("SELECT 1").await.unwrap();
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(dataset.columns.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_with_dataset() {
        let canned = Dataset::with_data(
            vec![ColumnInfo::new("id", "integer")],
            vec![vec![Value::Int(1)], vec![Value::Int(2)]],
        );
        let client = MockDatabaseClient::with_dataset(canned);

        let dataset = client.execute_query("SELECT * FROM anything").await.unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows[1][0], Value::Int(2));
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = FailingDatabaseClient::with_message("boom");
        let result = client.execute_query("SELECT 1").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("boom"));
    }
}
