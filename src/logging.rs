//! Logging configuration for sqlsheet.
//!
//! Reports usually run unattended, so logs go to a file when one is
//! configured and to stderr otherwise.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initializes logging to the given file.
///
/// The parent directory is created on demand. If the file cannot be
/// created, a warning is printed and logging falls back to stderr.
pub fn init_file_logging(log_path: &Path) {
    // Ensure parent directory exists
    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            init_stderr_logging();
            return;
        }
    }

    let log_file = match File::options().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            init_stderr_logging();
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false) // No ANSI colors in file output
        .init();
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Returns the default path for the log file.
///
/// Uses the XDG state directory on Linux (`~/.local/state/sqlsheet/sqlsheet.log`),
/// or falls back to the config directory on other platforms.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("sqlsheet").join("sqlsheet.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sqlsheet").join("sqlsheet.log");
    }

    // Last resort: temp directory
    std::env::temp_dir().join("sqlsheet.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_absolute() {
        let path = default_log_path();
        assert!(path.is_absolute());
    }

    #[test]
    fn test_log_path_ends_with_sqlsheet_log() {
        let path = default_log_path();
        assert!(path.ends_with("sqlsheet.log"));
    }
}
