//! CLI entry point for the GA4 week-over-week analyzer.
//!
//! Loads a GA4 exploration export, compares each week with the previous one
//! for every configured dimension, and writes CSV tables plus a Markdown
//! executive summary.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use ga4_wow::analyzers::analyzer::{Prepared, RunConfig, RunOutcome, run};
use ga4_wow::config::AnalyzerConfig;
use ga4_wow::loader::load_records;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ga4_wow")]
#[command(about = "Week-over-week reports from a GA4 export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build week-over-week CSV tables and the executive summary
    Analyze {
        /// GA4 CSV export
        #[arg(value_name = "CSV")]
        source: PathBuf,

        /// Directory to write reports to
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Optional JSON config (export layout, dimensions)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// List the weeks found in an export and any missing dates
    Weeks {
        /// GA4 CSV export
        #[arg(value_name = "CSV")]
        source: PathBuf,

        /// Optional JSON config (export layout)
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ga4_wow.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ga4_wow.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            output_dir,
            config,
        } => {
            let config = AnalyzerConfig::load_or_default(config.as_deref())?;
            let export = load_records(&source, &config.layout)?;

            let run_config = RunConfig {
                output_dir,
                dimensions: config.dimensions,
            };

            match run(&export.records, &run_config)? {
                RunOutcome::InsufficientWeeks { found } => {
                    println!(
                        "Need at least 2 weeks of data for comparison (found {found}). No reports written."
                    );
                }
                RunOutcome::Completed(summary) => {
                    for (dimension, reason) in &summary.failed {
                        warn!(dimension = %dimension, reason = %reason, "Report skipped");
                    }
                    info!(
                        weeks = summary.weeks.len(),
                        incomplete_weeks = summary.incomplete_weeks,
                        files = summary.written.len(),
                        failed = summary.failed.len(),
                        "Analysis complete"
                    );
                    println!(
                        "Analysis complete. Reports saved to {}",
                        run_config.output_dir.display()
                    );
                }
            }
        }
        Commands::Weeks { source, config } => {
            let config = AnalyzerConfig::load_or_default(config.as_deref())?;
            let export = load_records(&source, &config.layout)?;

            let Some(prepared) = Prepared::new(&export.records) else {
                println!("No valid data rows loaded.");
                return Ok(());
            };

            for info in &prepared.completeness {
                let week = &info.week;
                if info.is_complete() {
                    println!(
                        "{}: {} to {} (complete)",
                        week.label(),
                        week.start,
                        week.end()
                    );
                } else {
                    let missing: Vec<String> =
                        info.missing_dates.iter().map(|d| d.to_string()).collect();
                    println!(
                        "{}: {} to {} (missing {}: {})",
                        week.label(),
                        week.start,
                        week.end(),
                        missing.len(),
                        missing.join(", ")
                    );
                }
            }

            if !prepared.can_compare() {
                println!("Need at least 2 weeks of data for comparison.");
            }
        }
    }

    Ok(())
}
