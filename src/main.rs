//! sqlsheet - run named SQL queries and export the results to a workbook.

mod cli;

use anyhow::Context;
use cli::Cli;
use sqlsheet::config::Config;
use sqlsheet::error::ReportError;
use sqlsheet::logging;
use sqlsheet::report::{Report, ReportDefinition, RunMode, RunSummary};
use std::io::{IsTerminal, Write};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Pick up DB passwords and log settings from a .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    // Config loads before logging so [report].log_file can take effect.
    let config_path = cli.config_path();
    let mut config = match Config::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", e.category(), e);
            wait_for_ack(cli.no_prompt);
            std::process::exit(1);
        }
    };

    if let Some(output_dir) = &cli.output_dir {
        config.report.output_dir = output_dir.clone();
    }

    // Log to a file when one is configured, otherwise to stderr
    match cli.log_file.clone().or_else(|| config.report.log_file.clone()) {
        Some(log_path) => logging::init_file_logging(&log_path),
        None => logging::init_stderr_logging(),
    }

    info!("Loaded config from: {}", config_path.display());

    match run_report(&cli, config).await {
        Ok(summary) => {
            if let Some(workbook) = &summary.workbook {
                println!(
                    "Exported {} sheets to {}",
                    summary.sheets.len(),
                    workbook.display()
                );
            }
            for csv in &summary.csv_files {
                println!("Exported oversized dataset to {}", csv.display());
            }
        }
        Err(e) => {
            match e.downcast_ref::<ReportError>() {
                Some(report_err) => error!("{}: {}", report_err.category(), report_err),
                None => error!("{:#}", e),
            }
            wait_for_ack(cli.no_prompt);
            std::process::exit(1);
        }
    }
}

async fn run_report(cli: &Cli, config: Config) -> anyhow::Result<RunSummary> {
    let definition = ReportDefinition::load_from_file(&cli.report)
        .with_context(|| format!("loading report definition {}", cli.report.display()))?;
    let report = Report::from_definition(definition, config)?;

    let mode = if cli.single_thread {
        RunMode::Serial
    } else {
        RunMode::Parallel
    };

    Ok(report.run(mode).await?)
}

/// Waits for the user to acknowledge a failure before the process exits,
/// so a report launched from a desktop shortcut doesn't vanish with its
/// error message. Skipped when stdin is not a terminal.
fn wait_for_ack(no_prompt: bool) {
    if no_prompt || !std::io::stdin().is_terminal() {
        return;
    }

    eprint!("Press Enter to exit...");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}
