//! Data types produced by the carrier analysis pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::NormalizedRecord;

/// Mean values and activity for one route across the carrier's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAggregate {
    pub(crate) route: String,
    pub(crate) avg_our_revenue: Option<f64>,
    pub(crate) avg_market_revenue: Option<f64>,
    pub(crate) avg_share: Option<f64>,
    pub(crate) years_active: usize,
}

/// First-vs-last-year revenue for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTrend {
    pub(crate) year_first: i32,
    pub(crate) rev_first: Option<f64>,
    pub(crate) year_last: i32,
    pub(crate) rev_last: Option<f64>,
}

/// One row of `<carrier>_route_summary.csv`.
///
/// Field order is the CSV column order. Missing values serialize as empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route: String,
    pub avg_annual_our_revenue: Option<f64>,
    pub avg_annual_market_revenue: Option<f64>,
    pub avg_share: Option<f64>,
    pub years_active: usize,
    pub year_first: i32,
    pub rev_first: Option<f64>,
    pub year_last: i32,
    pub rev_last: Option<f64>,
    pub rev_change: Option<f64>,
    pub rev_change_pct: Option<f64>,
}

/// One row of `<carrier>_underperforming_routes.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderperformingRoute {
    pub route: String,
    pub avg_annual_our_revenue: Option<f64>,
    pub avg_share: f64,
    pub rev_first: Option<f64>,
    pub rev_last: Option<f64>,
    pub rev_change: f64,
    pub rev_change_pct: Option<f64>,
}

/// Cut-offs for flagging a route as underperforming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Average share must be strictly below this.
    pub share: f64,
    /// Revenue change must be at or below this.
    pub rev_change: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            share: 0.25,
            rev_change: 0.0,
        }
    }
}

/// Result of narrowing a dataset to one carrier.
#[derive(Debug)]
pub struct CarrierAnalysis {
    pub carrier: String,
    /// Rows where `carrier` is the largest carrier, in input order.
    pub records: Vec<NormalizedRecord>,
    /// One entry per route, ordered by route key.
    pub summaries: Vec<RouteSummary>,
}

/// JSON companion written next to the CSV outputs.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) carrier: String,
    pub(crate) data_path: String,
    pub(crate) year_min: i32,
    pub(crate) year_max: i32,
    pub(crate) thresholds: Thresholds,
    pub(crate) rows_read: usize,
    pub(crate) rows_retained: usize,
    pub(crate) share_was_percent: bool,
    pub(crate) parse_warnings: usize,
    pub(crate) carrier_rows: usize,
    pub(crate) routes: usize,
    pub(crate) underperforming_routes: usize,
    pub(crate) caveat: &'static str,
}
