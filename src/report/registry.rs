//! Query registry.
//!
//! Holds a report's queries in insertion order. Names are unique within
//! one registry; the exported workbook's sheet order follows the registry
//! order.

use super::query::{validate_name, QueryDef};
use crate::error::{ReportError, Result};
use tracing::debug;

/// Ordered collection of uniquely named queries.
#[derive(Debug, Clone, Default)]
pub struct QueryRegistry {
    queries: Vec<QueryDef>,
}

impl QueryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query. Fails with a naming conflict if the name is taken.
    pub fn add(&mut self, query: QueryDef) -> Result<()> {
        if self.contains(&query.name) {
            return Err(ReportError::name(format!(
                "query '{}' already exists",
                query.name
            )));
        }
        debug!("Adding query '{}'", query.name);
        self.queries.push(query);
        Ok(())
    }

    /// Removes a query by name, returning its definition.
    pub fn remove(&mut self, name: &str) -> Result<QueryDef> {
        let index = self
            .position(name)
            .ok_or_else(|| ReportError::name(format!("query '{name}' not found")))?;
        debug!("Removing query '{}'", name);
        Ok(self.queries.remove(index))
    }

    /// Renames a query. The old name must exist and the new name must be free.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        validate_name(new)?;
        if self.contains(new) {
            return Err(ReportError::name(format!("query '{new}' already exists")));
        }
        let index = self
            .position(old)
            .ok_or_else(|| ReportError::name(format!("query '{old}' not found")))?;
        debug!("Renaming query '{}' to '{}'", old, new);
        self.queries[index].name = new.to_string();
        Ok(())
    }

    /// Returns true if a query with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of registered queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Returns true if no queries are registered.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Iterates over queries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &QueryDef> {
        self.queries.iter()
    }

    /// Returns the query names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.queries.iter().map(|q| q.name.as_str()).collect()
    }

    /// Removes all queries.
    pub fn clear(&mut self) {
        self.queries.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.queries.iter().position(|q| q.name == name)
    }
}
