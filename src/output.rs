//! Output formatting and persistence for route analysis results.
//!
//! Supports CSV output for summaries, a JSON run report, and a console report
//! logged through `tracing`.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{RouteSummary, RunReport, UnderperformingRoute};
use csv::WriterBuilder;
use std::cmp::Ordering;
use std::fs::File;
use std::path::Path;

/// Shown wherever revenue figures are reported.
pub const REVENUE_CAVEAT: &str = "Revenue figures are estimates: market revenue (passengers x average fare) \
multiplied by the largest carrier's market share, not reported carrier revenue.";

pub const ROUTE_SUMMARY_COLUMNS: &[&str] = &[
    "route",
    "avg_annual_our_revenue",
    "avg_annual_market_revenue",
    "avg_share",
    "years_active",
    "year_first",
    "rev_first",
    "year_last",
    "rev_last",
    "rev_change",
    "rev_change_pct",
];

pub const UNDERPERFORMING_COLUMNS: &[&str] = &[
    "route",
    "avg_annual_our_revenue",
    "avg_share",
    "rev_first",
    "rev_last",
    "rev_change",
    "rev_change_pct",
];

const TOP_ROUTES: usize = 10;
const UNDERPERFORMING_SHOWN: usize = 15;

/// Writes rows under an explicit header so that an empty table still has one.
fn write_table<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV");

    let file = File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes every route summary to `path`.
pub fn write_route_summary(path: &Path, summaries: &[RouteSummary]) -> Result<()> {
    write_table(path, ROUTE_SUMMARY_COLUMNS, summaries)
}

/// Writes the underperforming routes to `path`, header only when there are none.
pub fn write_underperforming(path: &Path, routes: &[UnderperformingRoute]) -> Result<()> {
    write_table(path, UNDERPERFORMING_COLUMNS, routes)
}

/// Reads a file written by [`write_route_summary`]. Empty cells come back as `None`.
pub fn read_route_summary(path: &Path) -> Result<Vec<RouteSummary>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: RouteSummary = result?;
        rows.push(record);
    }

    Ok(rows)
}

/// Writes the run report as pretty-printed JSON.
pub fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    let body = serde_json::to_string_pretty(report)?;
    std::fs::write(path, body).with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(())
}

/// Logs the run report as pretty-printed JSON.
pub fn print_json(report: &RunReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn fmt_money(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.0}"))
}

fn fmt_ratio(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

/// Logs the highest-revenue routes and the underperforming ones.
pub fn log_route_report(summaries: &[RouteSummary], underperforming: &[UnderperformingRoute]) {
    let mut by_revenue: Vec<&RouteSummary> = summaries.iter().collect();
    // missing revenue sorts last
    by_revenue.sort_by(|a, b| match (a.avg_annual_our_revenue, b.avg_annual_our_revenue) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    info!(shown = by_revenue.len().min(TOP_ROUTES), "Top routes by average annual estimated revenue");
    for s in by_revenue.iter().take(TOP_ROUTES) {
        info!(
            route = %s.route,
            avg_annual_our_revenue = %fmt_money(s.avg_annual_our_revenue),
            avg_share = %fmt_ratio(s.avg_share),
            rev_change_pct = %fmt_ratio(s.rev_change_pct),
            "Route"
        );
    }

    if underperforming.is_empty() {
        info!("No routes meet underperformance criteria with current thresholds");
    } else {
        info!(
            total = underperforming.len(),
            shown = underperforming.len().min(UNDERPERFORMING_SHOWN),
            "Underperforming routes (low share + flat/declining revenue)"
        );
        for r in underperforming.iter().take(UNDERPERFORMING_SHOWN) {
            info!(
                route = %r.route,
                avg_annual_our_revenue = %fmt_money(r.avg_annual_our_revenue),
                avg_share = %fmt_ratio(Some(r.avg_share)),
                rev_first = %fmt_money(r.rev_first),
                rev_last = %fmt_money(r.rev_last),
                rev_change = %fmt_money(Some(r.rev_change)),
                rev_change_pct = %fmt_ratio(r.rev_change_pct),
                "Underperforming route"
            );
        }
    }

    info!("{}", REVENUE_CAVEAT);
}
