//! Report orchestration.
//!
//! A `Report` is a named, ordered set of SQL queries bound to connections.
//! Running it executes every query (concurrently by default), exports one
//! sheet per query into a single workbook, and on failure backs up the
//! completed results so a same-day re-run can resume.

mod definition;
mod query;
mod registry;
mod runner;

pub use definition::{QueryEntry, ReportDefinition};
pub use query::{ConnectionRef, QueryDef};
pub use registry::QueryRegistry;
pub use runner::RunMode;

use crate::backup::BackupStore;
use crate::config::Config;
use crate::db::Dataset;
use crate::error::{ReportError, Result};
use crate::export;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{error, info};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The exported workbook, if at least one sheet was written.
    pub workbook: Option<PathBuf>,

    /// CSV files written for datasets too large for a worksheet.
    pub csv_files: Vec<PathBuf>,

    /// Sheet names in workbook order.
    pub sheets: Vec<String>,

    /// How many datasets were restored from a same-day backup instead of
    /// being queried.
    pub resumed: usize,
}

/// A named set of queries with execution and export behavior.
pub struct Report {
    name: String,
    config: Config,
    registry: QueryRegistry,
}

impl Report {
    /// Creates an empty report. The name becomes the workbook file stem.
    pub fn new(name: impl Into<String>, config: Config) -> Result<Self> {
        let name = name.into();
        query::validate_name(&name)?;
        Ok(Self {
            name,
            config,
            registry: QueryRegistry::new(),
        })
    }

    /// Builds a report from a definition file's contents.
    pub fn from_definition(definition: ReportDefinition, config: Config) -> Result<Self> {
        let mut report = Self::new(definition.name, config)?;
        for entry in definition.queries {
            report.add_query(entry.name, entry.sql, entry.connection)?;
        }
        Ok(report)
    }

    /// Returns the report name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the report, changing the export file name.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        query::validate_name(&name)?;
        info!("Renaming report to '{}'", name);
        self.name = name;
        Ok(())
    }

    /// Adds a query to be run. The name must be unique within the report.
    pub fn add_query(
        &mut self,
        name: impl Into<String>,
        sql: impl Into<String>,
        connection: impl Into<ConnectionRef>,
    ) -> Result<()> {
        self.registry.add(QueryDef::new(name, sql, connection)?)
    }

    /// Removes a query by name.
    pub fn remove_query(&mut self, name: &str) -> Result<()> {
        self.registry.remove(name).map(|_| ())
    }

    /// Renames a query.
    pub fn rename_query(&mut self, old: &str, new: &str) -> Result<()> {
        self.registry.rename(old, new)
    }

    /// Returns the query names in registry order.
    pub fn query_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Returns the query registry.
    pub fn registry(&self) -> &QueryRegistry {
        &self.registry
    }

    /// Clears all queries and deletes any backup data.
    pub fn reset(&mut self) -> Result<()> {
        info!("Resetting report '{}'", self.name);
        self.registry.clear();
        self.backup_store().clear()
    }

    /// Runs all registered queries and exports the results.
    ///
    /// Queries run concurrently by default (`RunMode::Parallel`), one task
    /// per query. Each query that completes yields one worksheet, in
    /// registry order. When any query fails, the completed datasets are
    /// backed up and an error is returned; a re-run on the same day loads
    /// the backed-up datasets instead of re-querying their sources.
    pub async fn run(&self, mode: RunMode) -> Result<RunSummary> {
        if self.registry.is_empty() {
            return Err(ReportError::EmptyReport);
        }

        info!(
            "Running report '{}' with {} queries",
            self.name,
            self.registry.len()
        );

        let backup = self.backup_store();
        let resumable = backup.is_resumable_today();

        // Split queries into datasets restored from backup and jobs to run.
        let mut completed: HashMap<String, Dataset> = HashMap::new();
        let mut pending = Vec::new();
        for query in self.registry.iter() {
            if resumable {
                if let Some(dataset) = backup.load(&query.name)? {
                    completed.insert(query.name.clone(), dataset);
                    continue;
                }
            }
            pending.push(query);
        }
        let resumed = completed.len();

        // Resolve connections up front so queries naming the same
        // connection share one client. A resolution failure counts as
        // that query's failure and does not stop the others.
        let mut cache = runner::ConnectionCache::new();
        let mut failed: Vec<(String, ReportError)> = Vec::new();
        let mut jobs = Vec::with_capacity(pending.len());
        for query in pending {
            match cache.resolve(&self.config, &query.connection).await {
                Ok(client) => jobs.push(runner::QueryJob {
                    name: query.name.clone(),
                    sql: query.sql.clone(),
                    client,
                }),
                Err(e) => failed.push((query.name.clone(), e)),
            }
        }

        let outcomes = runner::execute_all(jobs, mode).await;
        cache.close_all().await;

        for outcome in outcomes {
            match outcome.result {
                Ok(dataset) => {
                    completed.insert(outcome.name, dataset);
                }
                Err(e) => failed.push((outcome.name, e)),
            }
        }

        if !failed.is_empty() {
            self.back_up(&backup, &completed)?;
            let (first_name, first_err) = &failed[0];
            return Err(ReportError::query(format!(
                "{} of {} queries failed (first: '{}': {})",
                failed.len(),
                self.registry.len(),
                first_name,
                first_err
            )));
        }

        // Export in registry order.
        let mut ordered = Vec::with_capacity(self.registry.len());
        for query in self.registry.iter() {
            let dataset = completed.remove(&query.name).ok_or_else(|| {
                ReportError::internal(format!("missing result for query '{}'", query.name))
            })?;
            ordered.push((query.name.clone(), dataset));
        }

        let output = match export::export_report(
            &self.name,
            &self.config.report.output_dir,
            &ordered,
        ) {
            Ok(output) => output,
            Err(e) => {
                // Export failed after all queries succeeded: keep the data.
                let completed: HashMap<String, Dataset> = ordered.into_iter().collect();
                self.back_up(&backup, &completed)?;
                return Err(e);
            }
        };

        backup.clear()?;
        info!("Report '{}' finished", self.name);

        Ok(RunSummary {
            workbook: output.workbook,
            csv_files: output.csv_files,
            sheets: output.sheets,
            resumed,
        })
    }

    fn backup_store(&self) -> BackupStore {
        BackupStore::new(&self.config.report.backup_dir)
    }

    /// Backs up completed datasets after a failed run.
    fn back_up(&self, backup: &BackupStore, completed: &HashMap<String, Dataset>) -> Result<()> {
        error!(
            "Report '{}' failed; backing up completed data to '{}'",
            self.name,
            backup.dir().display()
        );
        backup.stamp()?;
        for (name, dataset) in completed {
            backup.save(name, dataset)?;
        }
        info!("Backup successful");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ColumnInfo, DatabaseClient, FailingDatabaseClient, MockDatabaseClient, Value};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.report.output_dir = dir.join("out");
        config.report.backup_dir = dir.join("backup");
        config
    }

    fn mock_client() -> Arc<dyn DatabaseClient> {
        let dataset = Dataset::with_data(
            vec![ColumnInfo::new("n", "integer")],
            vec![vec![Value::Int(1)]],
        );
        Arc::new(MockDatabaseClient::with_dataset(dataset))
    }

    #[test]
    fn test_invalid_report_name_rejected() {
        assert!(Report::new("bad/name", Config::default()).is_err());
        assert!(Report::new("", Config::default()).is_err());
    }

    #[test]
    fn test_add_duplicate_query_rejected() {
        let mut report = Report::new("sales", Config::default()).unwrap();
        report.add_query("q1", "SELECT 1", mock_client()).unwrap();

        let err = report.add_query("q1", "SELECT 2", mock_client()).unwrap_err();
        assert!(matches!(err, ReportError::Name(_)));
    }

    #[test]
    fn test_rename_and_remove_query() {
        let mut report = Report::new("sales", Config::default()).unwrap();
        report.add_query("q1", "SELECT 1", mock_client()).unwrap();

        report.rename_query("q1", "first").unwrap();
        assert_eq!(report.query_names(), vec!["first"]);

        report.remove_query("first").unwrap();
        assert!(report.query_names().is_empty());
    }

    #[tokio::test]
    async fn test_run_empty_report_fails() {
        let dir = tempdir().unwrap();
        let report = Report::new("empty", test_config(dir.path())).unwrap();

        let err = report.run(RunMode::Parallel).await.unwrap_err();
        assert!(matches!(err, ReportError::EmptyReport));
    }

    #[tokio::test]
    async fn test_run_exports_one_sheet_per_query() {
        let dir = tempdir().unwrap();
        let mut report = Report::new("sales", test_config(dir.path())).unwrap();
        report.add_query("category", "SELECT 1", mock_client()).unwrap();
        report.add_query("segment", "SELECT 2", mock_client()).unwrap();

        let summary = report.run(RunMode::Parallel).await.unwrap();

        assert_eq!(summary.sheets, vec!["category", "segment"]);
        assert_eq!(summary.resumed, 0);
        let workbook = summary.workbook.unwrap();
        assert!(workbook.is_file());
        assert_eq!(workbook, dir.path().join("out").join("sales.xlsx"));
    }

    #[tokio::test]
    async fn test_failed_run_backs_up_completed_datasets() {
        let dir = tempdir().unwrap();
        let mut report = Report::new("sales", test_config(dir.path())).unwrap();
        report.add_query("good", "SELECT 1", mock_client()).unwrap();
        let failing: Arc<dyn DatabaseClient> = Arc::new(FailingDatabaseClient::new());
        report.add_query("bad", "SELECT 2", failing).unwrap();

        let err = report.run(RunMode::Parallel).await.unwrap_err();
        assert!(err.to_string().contains("1 of 2 queries failed"));

        let backup_dir = dir.path().join("backup");
        assert!(backup_dir.join("good.json").is_file());
        assert!(backup_dir.join("start_date.txt").is_file());
        assert!(!backup_dir.join("bad.json").exists());
    }

    #[tokio::test]
    async fn test_rerun_resumes_from_backup() {
        let dir = tempdir().unwrap();

        // First run: one query fails, the other is backed up.
        let mut report = Report::new("sales", test_config(dir.path())).unwrap();
        report.add_query("good", "SELECT 1", mock_client()).unwrap();
        let failing: Arc<dyn DatabaseClient> = Arc::new(FailingDatabaseClient::new());
        report.add_query("bad", "SELECT 2", failing).unwrap();
        assert!(report.run(RunMode::Parallel).await.is_err());

        // Second run same day: the fixed report resumes the good dataset.
        let mut report = Report::new("sales", test_config(dir.path())).unwrap();
        report.add_query("good", "SELECT 1", mock_client()).unwrap();
        report.add_query("bad", "SELECT 2", mock_client()).unwrap();

        let summary = report.run(RunMode::Parallel).await.unwrap();

        assert_eq!(summary.resumed, 1);
        assert_eq!(summary.sheets, vec!["good", "bad"]);

        // Backup is cleaned up after the successful run.
        assert!(!dir.path().join("backup").join("good.json").exists());
    }

    #[tokio::test]
    async fn test_rename_changes_workbook_name() {
        let dir = tempdir().unwrap();
        let mut report = Report::new("draft", test_config(dir.path())).unwrap();
        report.add_query("q", "SELECT 1", mock_client()).unwrap();

        report.rename("final").unwrap();
        let summary = report.run(RunMode::Serial).await.unwrap();

        assert_eq!(
            summary.workbook.unwrap(),
            dir.path().join("out").join("final.xlsx")
        );
    }

    #[tokio::test]
    async fn test_reset_clears_queries_and_backup() {
        let dir = tempdir().unwrap();
        let mut report = Report::new("sales", test_config(dir.path())).unwrap();
        let failing: Arc<dyn DatabaseClient> = Arc::new(FailingDatabaseClient::new());
        report.add_query("good", "SELECT 1", mock_client()).unwrap();
        report.add_query("bad", "SELECT 2", failing).unwrap();
        assert!(report.run(RunMode::Parallel).await.is_err());

        report.reset().unwrap();

        assert!(report.query_names().is_empty());
        assert!(!dir.path().join("backup").join("good.json").exists());
    }
}
