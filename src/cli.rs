//! Command-line argument parsing for sqlsheet.

use clap::Parser;
use std::path::PathBuf;

/// Run a report definition: execute its queries and export one workbook.
#[derive(Parser, Debug)]
#[command(name = "sqlsheet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Report definition file (TOML with a name and [[queries]] entries)
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run queries one at a time instead of concurrently
    #[arg(long)]
    pub single_thread: bool,

    /// Directory for the exported workbook (overrides config)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the process log to this file instead of stderr
    #[arg(long, value_name = "PATH", env = "SQLSHEET_LOG")]
    pub log_file: Option<PathBuf>,

    /// Never wait for a keypress after a failure
    #[arg(long)]
    pub no_prompt: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(sqlsheet::config::Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_report_path() {
        let cli = parse_args(&["sqlsheet", "sales.toml"]);
        assert_eq!(cli.report, PathBuf::from("sales.toml"));
        assert!(!cli.single_thread);
        assert!(!cli.no_prompt);
    }

    #[test]
    fn test_parse_single_thread_flag() {
        let cli = parse_args(&["sqlsheet", "sales.toml", "--single-thread"]);
        assert!(cli.single_thread);
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse_args(&["sqlsheet", "sales.toml", "--config", "/path/to/config.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.toml")));
        assert_eq!(cli.config_path(), PathBuf::from("/path/to/config.toml"));
    }

    #[test]
    fn test_default_config_path() {
        let cli = parse_args(&["sqlsheet", "sales.toml"]);
        assert!(cli.config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_parse_output_dir() {
        let cli = parse_args(&["sqlsheet", "sales.toml", "-o", "reports"]);
        assert_eq!(cli.output_dir, Some(PathBuf::from("reports")));
    }

    #[test]
    fn test_parse_no_prompt() {
        let cli = parse_args(&["sqlsheet", "sales.toml", "--no-prompt"]);
        assert!(cli.no_prompt);
    }
}
