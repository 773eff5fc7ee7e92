//! Loading and normalization of the route fares dataset.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, ParseWarning, WarningKind};
use crate::parser::{RawRecord, parse_records};

/// Shares above this maximum mean the column is in percent, not fractions.
pub const PERCENT_SHARE_THRESHOLD: f64 = 1.5;

/// Joins origin and destination into a route key.
pub const ROUTE_SEPARATOR: &str = "-";

const WARNINGS_LOGGED: usize = 10;

/// A dataset row inside the year window, with derived revenue fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub year: i32,
    pub quarter: Option<i32>,
    pub origin: String,
    pub dest: String,
    pub route: String,
    pub passengers: Option<f64>,
    pub avg_fare: Option<f64>,
    pub largest_carrier: String,
    /// Always a 0–1 fraction when present.
    pub largest_ms: Option<f64>,
    pub market_revenue: Option<f64>,
    pub our_revenue: Option<f64>,
}

/// The normalized records of one load, plus what happened while loading.
#[derive(Debug, Default)]
pub struct Dataset {
    pub records: Vec<NormalizedRecord>,
    pub rows_read: usize,
    pub share_was_percent: bool,
    pub warnings: Vec<ParseWarning>,
}

impl Dataset {
    /// Reads the dataset at `path`, keeping rows with `year_min <= year <= year_max`.
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(
        path: impl AsRef<Path>,
        year_min: i32,
        year_max: i32,
    ) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let file = BufReader::new(File::open(path)?);

        let is_gzip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

        let reader: Box<dyn Read> = if is_gzip {
            debug!("Decompressing gzip input");
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        Self::from_reader(reader, year_min, year_max)
    }

    /// Same as [`Dataset::load`] for an already opened source.
    pub fn from_reader<R: Read>(
        reader: R,
        year_min: i32,
        year_max: i32,
    ) -> Result<Self, AnalysisError> {
        if year_min > year_max {
            return Err(AnalysisError::InvalidYearRange {
                min: year_min,
                max: year_max,
            });
        }

        let (raw, warnings) = parse_records(reader)?;
        let dataset = normalize(raw, warnings, year_min, year_max);

        info!(
            rows_read = dataset.rows_read,
            rows_retained = dataset.records.len(),
            year_min,
            year_max,
            share_was_percent = dataset.share_was_percent,
            warnings = dataset.warnings.len(),
            "Dataset loaded"
        );
        dataset.log_warnings();

        Ok(dataset)
    }

    /// Most frequent largest-carrier codes, highest count first.
    pub fn top_carriers(&self, n: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for r in &self.records {
            *counts.entry(r.largest_carrier.as_str()).or_default() += 1;
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(code, count)| (code.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    fn log_warnings(&self) {
        for w in self.warnings.iter().take(WARNINGS_LOGGED) {
            warn!("{}", w);
        }
        if self.warnings.len() > WARNINGS_LOGGED {
            warn!(
                suppressed = self.warnings.len() - WARNINGS_LOGGED,
                "Further field warnings suppressed"
            );
        }
    }
}

/// Applies the year window, derives the route key and revenue fields, and
/// puts the market-share column into fraction units.
///
/// The unit decision is made once for the whole column: if the largest
/// retained share exceeds [`PERCENT_SHARE_THRESHOLD`], every share is divided
/// by 100. A single stray value above the threshold in a fraction-unit file
/// will therefore convert the whole column.
pub fn normalize(
    raw: Vec<RawRecord>,
    mut warnings: Vec<ParseWarning>,
    year_min: i32,
    year_max: i32,
) -> Dataset {
    let rows_read = raw.len();

    let retained: Vec<(i32, RawRecord)> = raw
        .into_iter()
        .filter_map(|r| match r.year {
            Some(year) if year >= year_min && year <= year_max => Some((year, r)),
            _ => None,
        })
        .collect();

    let max_share = retained
        .iter()
        .filter_map(|(_, r)| r.largest_ms)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));
    let share_was_percent = max_share.is_some_and(|m| m > PERCENT_SHARE_THRESHOLD);

    let records = retained
        .into_iter()
        .map(|(year, r)| {
            let mut share = r.largest_ms.map(|v| {
                if share_was_percent {
                    v / 100.0
                } else {
                    v
                }
            });

            if let Some(v) = share {
                if !(0.0..=1.0).contains(&v) {
                    warnings.push(ParseWarning {
                        line: r.line,
                        column: "largest_ms",
                        value: v.to_string(),
                        kind: WarningKind::OutOfRange,
                    });
                    share = None;
                }
            }

            let market_revenue = r.passengers.zip(r.avg_fare).map(|(p, f)| p * f);
            let our_revenue = market_revenue.zip(share).map(|(m, s)| m * s);

            NormalizedRecord {
                year,
                quarter: r.quarter,
                route: format!("{}{}{}", r.origin, ROUTE_SEPARATOR, r.dest),
                origin: r.origin,
                dest: r.dest,
                passengers: r.passengers,
                avg_fare: r.avg_fare,
                largest_carrier: r.largest_carrier,
                largest_ms: share,
                market_revenue,
                our_revenue,
            }
        })
        .collect();

    Dataset {
        records,
        rows_read,
        share_was_percent,
        warnings,
    }
}
