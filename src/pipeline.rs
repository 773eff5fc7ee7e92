//! End-to-end run: load, analyze, classify, report.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analyzers::analyzer::summarize_for_carrier;
use crate::analyzers::classify::identify_underperforming;
use crate::analyzers::types::{RouteSummary, RunReport, UnderperformingRoute};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::output::{
    REVENUE_CAVEAT, log_route_report, write_route_summary, write_run_report,
    write_underperforming,
};

const TOP_CARRIERS: usize = 5;

type OutputWriter<'a> = &'a dyn Fn(&Path) -> Result<()>;

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Writes every output under a `.partial` name first and only renames them
/// into place once all writes succeeded. On failure the partial files are
/// removed and no final output appears.
fn write_staged(outputs: &[(&Path, OutputWriter<'_>)]) -> Result<usize> {
    let mut pending = Vec::new();

    for (path, write) in outputs {
        let tmp = partial_path(path);
        if let Err(e) = write(&tmp) {
            for p in pending.iter().chain([&tmp]) {
                if let Err(cleanup) = fs::remove_file(p) {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %p.display(), error = %cleanup, "Failed to remove partial output");
                    }
                }
            }
            return Err(e);
        }
        pending.push(tmp);
    }

    for ((path, _), tmp) in outputs.iter().zip(&pending) {
        fs::rename(tmp, path)
            .with_context(|| format!("Failed to move output into '{}'", path.display()))?;
    }

    Ok(pending.len())
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub summaries: Vec<RouteSummary>,
    pub underperforming: Vec<UnderperformingRoute>,
    pub report: RunReport,
}

/// Runs the whole analysis for `config`.
///
/// Output files are only written once every stage has succeeded, and are
/// moved into place together, so a failing run leaves no output behind.
#[tracing::instrument(skip(config), fields(carrier = %config.carrier))]
pub fn run(config: &AnalysisConfig) -> Result<RunOutcome> {
    config.validate()?;

    info!(path = %config.data_path.display(), "Loading and preparing data");
    let dataset = Dataset::load(&config.data_path, config.year_min, config.year_max)
        .with_context(|| format!("Failed to load '{}'", config.data_path.display()))?;

    let top: Vec<String> = dataset
        .top_carriers(TOP_CARRIERS)
        .into_iter()
        .map(|(code, count)| format!("{code}={count}"))
        .collect();
    info!(carriers = %top.join(", "), "Most frequent largest carriers");

    let analysis = summarize_for_carrier(&dataset.records, &config.carrier)?;

    let thresholds = config.thresholds();
    let underperforming = identify_underperforming(&analysis.summaries, &thresholds);

    log_route_report(&analysis.summaries, &underperforming);

    let report = RunReport {
        generated_at: Utc::now(),
        carrier: config.carrier.clone(),
        data_path: config.data_path.display().to_string(),
        year_min: config.year_min,
        year_max: config.year_max,
        thresholds,
        rows_read: dataset.rows_read,
        rows_retained: dataset.records.len(),
        share_was_percent: dataset.share_was_percent,
        parse_warnings: dataset.warnings.len(),
        carrier_rows: analysis.records.len(),
        routes: analysis.summaries.len(),
        underperforming_routes: underperforming.len(),
        caveat: REVENUE_CAVEAT,
    };

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            config.output_dir.display()
        )
    })?;
    let summary_path = config.route_summary_path();
    let underperforming_path = config.underperforming_path();
    let report_path = config.run_report_path();

    let outputs: [(&Path, OutputWriter<'_>); 3] = [
        (summary_path.as_path(), &|p: &Path| write_route_summary(p, &analysis.summaries)),
        (underperforming_path.as_path(), &|p: &Path| write_underperforming(p, &underperforming)),
        (report_path.as_path(), &|p: &Path| write_run_report(p, &report)),
    ];
    let written = write_staged(&outputs)?;
    debug!(files = written, "Outputs committed");

    info!(output_dir = %config.output_dir.display(), "Saved summary CSVs");

    Ok(RunOutcome {
        summaries: analysis.summaries,
        underperforming,
        report,
    })
}
