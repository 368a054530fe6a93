//! Report definition files.
//!
//! A report can be described in a TOML file (a name plus a list of
//! queries), which is how the CLI drives the library.

use crate::error::{ReportError, Result};
use serde::Deserialize;
use std::path::Path;

/// A report described in a TOML file.
///
/// ```toml
/// name = "yearly_sales"
///
/// [[queries]]
/// name = "category"
/// sql = "SELECT * FROM category"
/// connection = "warehouse"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ReportDefinition {
    /// Report name. Becomes the workbook file stem.
    pub name: String,

    /// Queries, in the order their sheets appear in the workbook.
    #[serde(default)]
    pub queries: Vec<QueryEntry>,
}

/// One query entry in a report definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryEntry {
    /// Query name, unique within the report.
    pub name: String,

    /// SQL text, formatted for the target database.
    pub sql: String,

    /// Name of a connection from the configuration file.
    pub connection: String,
}

impl ReportDefinition {
    /// Loads a report definition from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::config(format!(
                "Failed to read report definition '{}': {e}",
                path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            ReportError::config(format!(
                "Invalid report definition in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition() {
        let toml = r#"
name = "yearly_sales"

[[queries]]
name = "category"
sql = "SELECT * FROM category"
connection = "warehouse"

[[queries]]
name = "segment"
sql = "SELECT * FROM segment"
connection = "local"
"#;
        let definition: ReportDefinition = toml::from_str(toml).unwrap();

        assert_eq!(definition.name, "yearly_sales");
        assert_eq!(definition.queries.len(), 2);
        assert_eq!(definition.queries[0].name, "category");
        assert_eq!(definition.queries[1].connection, "local");
    }

    #[test]
    fn test_parse_definition_without_queries() {
        let definition: ReportDefinition = toml::from_str(r#"name = "empty""#).unwrap();
        assert_eq!(definition.name, "empty");
        assert!(definition.queries.is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = ReportDefinition::load_from_file(Path::new("/nonexistent/report.toml"));
        assert!(result.is_err());
    }
}
