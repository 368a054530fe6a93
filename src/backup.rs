//! Backup store for completed query results.
//!
//! When a run fails partway, every dataset that did complete is written to
//! the backup directory along with a date stamp. A re-run on the same day
//! loads those datasets instead of querying their sources again, resuming
//! the report near the point of failure. Backups from earlier days are
//! ignored and cleaned up by the next successful run.

use crate::db::Dataset;
use crate::error::{ReportError, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the file holding the ISO date of the failed run.
const STAMP_FILE: &str = "start_date.txt";

/// File-based store for backed-up datasets.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory itself is only created when a backup is written.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the backup directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns true if a backup from today exists.
    ///
    /// A stamp from an earlier day means the backup is stale and will not
    /// be used for resuming.
    pub fn is_resumable_today(&self) -> bool {
        let stamp_path = self.dir.join(STAMP_FILE);
        let Ok(stamp) = fs::read_to_string(&stamp_path) else {
            debug!("No backup found");
            return false;
        };

        let today = Local::now().date_naive().to_string();
        if stamp.trim() == today {
            info!("Resuming previous attempt from '{}'", self.dir.display());
            true
        } else {
            debug!("No recent backup files found");
            false
        }
    }

    /// Writes the date stamp for today's run.
    pub fn stamp(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ReportError::backup(format!("Failed to create backup dir: {e}")))?;

        let today = Local::now().date_naive().to_string();
        fs::write(self.dir.join(STAMP_FILE), today)
            .map_err(|e| ReportError::backup(format!("Failed to write stamp file: {e}")))
    }

    /// Saves a completed dataset under the query's name.
    pub fn save(&self, name: &str, dataset: &Dataset) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ReportError::backup(format!("Failed to create backup dir: {e}")))?;

        let path = self.dataset_path(name);
        debug!("Backing up '{}' to '{}'", name, path.display());

        let json = serde_json::to_vec(dataset)
            .map_err(|e| ReportError::backup(format!("Failed to serialize '{name}': {e}")))?;
        fs::write(&path, json)
            .map_err(|e| ReportError::backup(format!("Failed to write '{}': {e}", path.display())))
    }

    /// Loads a backed-up dataset by query name, if present.
    pub fn load(&self, name: &str) -> Result<Option<Dataset>> {
        let path = self.dataset_path(name);
        if !path.is_file() {
            return Ok(None);
        }

        info!("Reading backup file for '{}'", name);
        let json = fs::read(&path)
            .map_err(|e| ReportError::backup(format!("Failed to read '{}': {e}", path.display())))?;
        let dataset = serde_json::from_slice(&json)
            .map_err(|e| ReportError::backup(format!("Failed to parse '{}': {e}", path.display())))?;
        Ok(Some(dataset))
    }

    /// Deletes all backup files and the date stamp.
    pub fn clear(&self) -> Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(()), // nothing to clean
        };

        debug!("Cleaning up '{}'", self.dir.display());
        for entry in entries.flatten() {
            let path = entry.path();
            let is_backup_file = path.extension().is_some_and(|ext| ext == "json")
                || path.file_name().is_some_and(|f| f == STAMP_FILE);
            if is_backup_file {
                debug!("Removing '{}'", path.display());
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Could not remove '{}': {}", path.display(), e);
                }
            }
        }
        Ok(())
    }

    fn dataset_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ColumnInfo, Value};
    use tempfile::tempdir;

    fn sample_dataset() -> Dataset {
        Dataset::with_data(
            vec![ColumnInfo::new("id", "integer")],
            vec![vec![Value::Int(1)], vec![Value::Int(2)]],
        )
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = BackupStore::new(dir.path());

        store.save("sales", &sample_dataset()).unwrap();

        let restored = store.load("sales").unwrap().unwrap();
        assert_eq!(restored.row_count(), 2);
        assert_eq!(restored.rows[0][0], Value::Int(1));
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = BackupStore::new(dir.path());

        assert!(store.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_stamp_makes_backup_resumable() {
        let dir = tempdir().unwrap();
        let store = BackupStore::new(dir.path());

        assert!(!store.is_resumable_today());
        store.stamp().unwrap();
        assert!(store.is_resumable_today());
    }

    #[test]
    fn test_stale_stamp_is_not_resumable() {
        let dir = tempdir().unwrap();
        let store = BackupStore::new(dir.path());

        fs::write(dir.path().join(STAMP_FILE), "2000-01-01").unwrap();
        assert!(!store.is_resumable_today());
    }

    #[test]
    fn test_clear_removes_backup_files() {
        let dir = tempdir().unwrap();
        let store = BackupStore::new(dir.path());

        store.stamp().unwrap();
        store.save("sales", &sample_dataset()).unwrap();
        fs::write(dir.path().join("keep.txt"), "unrelated").unwrap();

        store.clear().unwrap();

        assert!(!dir.path().join("sales.json").exists());
        assert!(!dir.path().join(STAMP_FILE).exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_clear_on_missing_dir_is_ok() {
        let store = BackupStore::new("/nonexistent/backup/dir");
        assert!(store.clear().is_ok());
    }
}
