//! Main entry point for the unimg CLI application.
//!
//! Resolves the companion IMG and output locations for an LVZ file, routes
//! diagnostics to the log file and prints a one-line summary.

use clap::Parser;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::util::SubscriberInitExt;

use unimg::{Cli, ExtractError, ExtractSummary, run};

/// Application entry point.
///
/// Exit status is `0` on success and [`ExtractError::exit_code`] otherwise.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_cli(&cli).await {
        Ok(summary) => {
            if !cli.is_quiet() {
                eprintln!(
                    "unimg: extracted {} of {} WRLD files ({}) to {}",
                    summary.written,
                    summary.headers_found,
                    format_size(summary.payload_bytes),
                    cli.out_dir().display()
                );
                eprintln!("Log: {}", cli.log_path().display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("ERROR: {e}");
            if e.is_empty_result() {
                eprintln!("Log: {}", cli.log_path().display());
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Run one extraction as configured by `cli`.
async fn run_cli(cli: &Cli) -> Result<ExtractSummary, ExtractError> {
    let paths = run::prepare(cli)?;
    init_logging(&paths.log)?;
    run::execute(cli, &paths).await
}

/// Send all diagnostics to a fresh plain-text log at `path`.
fn init_logging(path: &Path) -> Result<(), ExtractError> {
    let file = File::create(path).map_err(|source| ExtractError::OpenLog {
        path: path.to_path_buf(),
        source,
    })?;

    run::log_subscriber(Mutex::new(file)).init();
    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
