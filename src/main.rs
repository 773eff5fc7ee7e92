//! CLI entry point for the route fare analyzer.
//!
//! Provides subcommands for staging the raw dataset locally and for running
//! the carrier route analysis over it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use route_fare_analyzer::{
    config::AnalysisConfig,
    fetch::{BasicClient, stage_dataset},
    output::print_json,
    pipeline,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_LOG_FILE: &str = "logs/route_fare_analyzer.log";

#[derive(Parser)]
#[command(name = "route_fare_analyzer")]
#[command(about = "Find routes where a carrier underperforms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy or download the raw fares dataset into a local data directory
    Stage {
        /// URL, CSV file, or directory containing CSV files
        #[arg(value_name = "URL_OR_PATH")]
        source: String,

        /// Directory to stage files into
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Summarize a carrier's routes and flag underperforming ones
    Analyze {
        /// JSON config file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to the fares CSV (optionally .gz)
        #[arg(long)]
        data: Option<PathBuf>,

        /// First year of the window (inclusive)
        #[arg(long)]
        year_min: Option<i32>,

        /// Last year of the window (inclusive)
        #[arg(long)]
        year_max: Option<i32>,

        /// Carrier code to analyze, matched against carrier_lg (e.g. "UA")
        #[arg(short = 'C', long)]
        carrier: Option<String>,

        /// Routes with average share below this are candidates
        #[arg(long)]
        share_threshold: Option<f64>,

        /// Routes with revenue change at or below this are candidates
        #[arg(long, allow_negative_numbers = true)]
        rev_change_threshold: Option<f64>,

        /// Directory for the output CSVs
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also log the run report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("route_fare_analyzer.log"));

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
        Commands::Stage { source, data_dir } => {
            let client = BasicClient::new()?;
            let staged = stage_dataset(&client, &source, &data_dir).await?;
            for path in &staged {
                info!(path = %path.display(), "Staged");
            }
        }
        Commands::Analyze {
            config,
            data,
            year_min,
            year_max,
            carrier,
            share_threshold,
            rev_change_threshold,
            output_dir,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => AnalysisConfig::load(path)?,
                None => AnalysisConfig::default(),
            };
            cfg.apply_env(|key| std::env::var(key).ok());

            if let Some(v) = data {
                cfg.data_path = v;
            }
            if let Some(v) = year_min {
                cfg.year_min = v;
            }
            if let Some(v) = year_max {
                cfg.year_max = v;
            }
            if let Some(v) = carrier {
                cfg.carrier = v;
            }
            if let Some(v) = share_threshold {
                cfg.share_threshold = v;
            }
            if let Some(v) = rev_change_threshold {
                cfg.rev_change_threshold = v;
            }
            if let Some(v) = output_dir {
                cfg.output_dir = v;
            }

            info!(
                carrier = %cfg.carrier,
                year_min = cfg.year_min,
                year_max = cfg.year_max,
                "Starting analysis"
            );

            let outcome = pipeline::run(&cfg)?;
            if json {
                print_json(&outcome.report)?;
            }
        }
    }

    Ok(())
}
