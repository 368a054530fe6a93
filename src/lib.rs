//! sqlsheet - run named SQL queries and export the results to a workbook.
//!
//! A report is a named, ordered set of SQL queries bound to configured
//! connections. Running it executes every query (concurrently by default)
//! and writes one worksheet per query into a single workbook, backing up
//! completed results when a run fails so the next same-day run can resume.
//!
//! ```no_run
//! use sqlsheet::config::Config;
//! use sqlsheet::report::{Report, RunMode};
//!
//! # async fn example() -> sqlsheet::error::Result<()> {
//! let config = Config::load_from_file(&Config::default_path())?;
//!
//! let mut report = Report::new("yearly_sales", config)?;
//! report.add_query("category", "SELECT * FROM category", "warehouse")?;
//! report.add_query("segment", "SELECT * FROM segment", "warehouse")?;
//!
//! let _summary = report.run(RunMode::Parallel).await?;
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod report;
