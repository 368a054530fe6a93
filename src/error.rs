//! Error types for sqlsheet.
//!
//! Defines the main error enum used throughout the library.

use thiserror::Error;

/// Main error type for report operations.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors (syntax errors, missing tables, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, missing connections, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Naming errors (duplicate query names, unknown names, invalid names).
    #[error("Name error: {0}")]
    Name(String),

    /// Export errors (workbook or CSV writing failures).
    #[error("Export error: {0}")]
    Export(String),

    /// Backup errors (failure while saving or restoring backup files).
    #[error("Backup error: {0}")]
    Backup(String),

    /// The report has no registered queries.
    #[error("Report contains no queries")]
    EmptyReport,

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a naming error with the given message.
    pub fn name(msg: impl Into<String>) -> Self {
        Self::Name(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a backup error with the given message.
    pub fn backup(msg: impl Into<String>) -> Self {
        Self::Backup(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Name(_) => "Name Error",
            Self::Export(_) => "Export Error",
            Self::Backup(_) => "Backup Error",
            Self::EmptyReport => "Empty Report",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ReportError.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = ReportError::connection("Cannot connect to localhost:5432");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot connect to localhost:5432"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_query() {
        let err = ReportError::query("table \"sales\" does not exist");
        assert_eq!(
            err.to_string(),
            "Query error: table \"sales\" does not exist"
        );
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = ReportError::config("connection 'warehouse' not found");
        assert_eq!(
            err.to_string(),
            "Configuration error: connection 'warehouse' not found"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_name() {
        let err = ReportError::name("query 'sales' already exists");
        assert_eq!(err.to_string(), "Name error: query 'sales' already exists");
        assert_eq!(err.category(), "Name Error");
    }

    #[test]
    fn test_error_display_empty_report() {
        let err = ReportError::EmptyReport;
        assert_eq!(err.to_string(), "Report contains no queries");
        assert_eq!(err.category(), "Empty Report");
    }

    #[test]
    fn test_error_display_backup() {
        let err = ReportError::backup("could not write stamp file");
        assert_eq!(err.to_string(), "Backup error: could not write stamp file");
        assert_eq!(err.category(), "Backup Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReportError>();
    }
}
