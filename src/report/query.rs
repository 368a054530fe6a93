//! Query definitions.
//!
//! A query is a named SQL statement bound to a connection, either by the
//! symbolic name of a configured connection or by a caller-supplied live
//! client.

use crate::db::DatabaseClient;
use crate::error::{ReportError, Result};
use std::fmt;
use std::sync::Arc;

/// Reference to the connection a query runs against.
#[derive(Clone)]
pub enum ConnectionRef {
    /// A connection name resolved through the configuration file.
    Named(String),

    /// A caller-supplied live connection handle.
    Live(Arc<dyn DatabaseClient>),
}

impl fmt::Debug for ConnectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Live(_) => f.write_str("Live(<connection>)"),
        }
    }
}

impl From<&str> for ConnectionRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ConnectionRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn DatabaseClient>> for ConnectionRef {
    fn from(client: Arc<dyn DatabaseClient>) -> Self {
        Self::Live(client)
    }
}

/// A named SQL query bound to a connection.
#[derive(Debug, Clone)]
pub struct QueryDef {
    /// Query name, unique within a report. Becomes the sheet name.
    pub name: String,

    /// SQL text, formatted for the target database.
    pub sql: String,

    /// The connection the query runs against.
    pub connection: ConnectionRef,
}

impl QueryDef {
    /// Creates a query definition, validating the name.
    pub fn new(
        name: impl Into<String>,
        sql: impl Into<String>,
        connection: impl Into<ConnectionRef>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            sql: sql.into(),
            connection: connection.into(),
        })
    }
}

/// Validates a report or query name.
///
/// Names become file stems and sheet names, so they must be non-empty and
/// free of path separators and other characters the spreadsheet format
/// rejects.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ReportError::name("name cannot be empty"));
    }

    if name.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|']) {
        return Err(ReportError::name(format!(
            "cannot use '{name}' as a name: it contains a reserved character"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDatabaseClient;

    #[test]
    fn test_new_query_def() {
        let query = QueryDef::new("sales", "SELECT * FROM sales", "warehouse").unwrap();
        assert_eq!(query.name, "sales");
        assert_eq!(query.sql, "SELECT * FROM sales");
        assert!(matches!(query.connection, ConnectionRef::Named(ref n) if n == "warehouse"));
    }

    #[test]
    fn test_live_connection_ref() {
        let client: Arc<dyn DatabaseClient> = Arc::new(MockDatabaseClient::new());
        let query = QueryDef::new("sales", "SELECT 1", client).unwrap();
        assert!(matches!(query.connection, ConnectionRef::Live(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = QueryDef::new("", "SELECT 1", "warehouse");
        assert!(result.is_err());

        let result = QueryDef::new("   ", "SELECT 1", "warehouse");
        assert!(result.is_err());
    }

    #[test]
    fn test_reserved_characters_rejected() {
        for name in ["a/b", "a\\b", "a:b", "a*b", "a?b"] {
            let result = QueryDef::new(name, "SELECT 1", "warehouse");
            assert!(result.is_err(), "expected '{name}' to be rejected");
        }
    }

    #[test]
    fn test_connection_ref_debug() {
        let named = ConnectionRef::Named("warehouse".to_string());
        assert!(format!("{named:?}").contains("warehouse"));

        let live: ConnectionRef = ConnectionRef::Live(Arc::new(MockDatabaseClient::new()));
        assert_eq!(format!("{live:?}"), "Live(<connection>)");
    }
}
