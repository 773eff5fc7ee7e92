//! CSV parser for the route fares dataset.
//!
//! Source columns are resolved through [`COLUMN_MAP`]; every other column in
//! the file is ignored. Numeric fields that do not parse are returned as
//! `None` together with a [`ParseWarning`].

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{AnalysisError, ParseWarning, WarningKind};

/// Source column name → internal field name.
pub const COLUMN_MAP: &[(&str, &str)] = &[
    ("Year", "year"),
    ("quarter", "quarter"),
    ("airport_1", "origin"),
    ("airport_2", "dest"),
    ("passengers", "passengers"),
    ("fare", "avg_fare"),
    ("carrier_lg", "largest_carrier"),
    ("large_ms", "largest_ms"),
];

/// One data row with the fields the pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: u64,
    pub year: Option<i32>,
    pub quarter: Option<i32>,
    pub origin: String,
    pub dest: String,
    pub passengers: Option<f64>,
    pub avg_fare: Option<f64>,
    pub largest_carrier: String,
    pub largest_ms: Option<f64>,
}

/// Positions of the mapped columns within a header row, in [`COLUMN_MAP`] order.
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndex([usize; 8]);

impl ColumnIndex {
    /// Resolves every mapped column, failing on the first one that is absent.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, AnalysisError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();

        let mut positions = [0usize; 8];
        for (slot, (source, _)) in positions.iter_mut().zip(COLUMN_MAP) {
            *slot = names
                .iter()
                .position(|name| name == source)
                .ok_or_else(|| AnalysisError::Schema {
                    column: source.to_string(),
                })?;
        }

        Ok(Self(positions))
    }

    fn get<'r>(&self, record: &'r StringRecord, field: usize) -> &'r str {
        record.get(self.0[field]).unwrap_or("").trim()
    }
}

const YEAR: usize = 0;
const QUARTER: usize = 1;
const ORIGIN: usize = 2;
const DEST: usize = 3;
const PASSENGERS: usize = 4;
const AVG_FARE: usize = 5;
const LARGEST_CARRIER: usize = 6;
const LARGEST_MS: usize = 7;

/// Reads every data row from `reader`.
///
/// # Errors
///
/// Returns [`AnalysisError::Schema`] if a mapped column is missing and
/// [`AnalysisError::Csv`] if the file is not readable as CSV.
pub fn parse_records<R: Read>(
    reader: R,
) -> Result<(Vec<RawRecord>, Vec<ParseWarning>), AnalysisError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnIndex::from_headers(rdr.headers()?)?;

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut row = StringRecord::new();

    while rdr.read_record(&mut row)? {
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let mut number = |field: usize, allow_negative: bool| {
            parse_number(
                columns.get(&row, field),
                line,
                COLUMN_MAP[field].1,
                allow_negative,
                &mut warnings,
            )
        };

        let passengers = number(PASSENGERS, false);
        let avg_fare = number(AVG_FARE, false);
        let largest_ms = number(LARGEST_MS, false);
        let quarter = number(QUARTER, true).and_then(whole);
        let year = parse_year(columns.get(&row, YEAR), line, &mut warnings);

        records.push(RawRecord {
            line,
            year,
            quarter,
            origin: columns.get(&row, ORIGIN).to_string(),
            dest: columns.get(&row, DEST).to_string(),
            passengers,
            avg_fare,
            largest_carrier: columns.get(&row, LARGEST_CARRIER).to_string(),
            largest_ms,
        });
    }

    debug!(rows = records.len(), warnings = warnings.len(), "Parsed dataset rows");
    Ok((records, warnings))
}

/// Empty cells are plain missing values; anything else that is not a finite
/// number is coerced to `None` with a warning.
fn parse_number(
    raw: &str,
    line: u64,
    column: &'static str,
    allow_negative: bool,
    warnings: &mut Vec<ParseWarning>,
) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }

    let kind = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && (allow_negative || v >= 0.0) => return Some(v),
        Ok(v) if v.is_finite() => WarningKind::OutOfRange,
        _ => WarningKind::NotANumber,
    };

    warnings.push(ParseWarning {
        line,
        column,
        value: raw.to_string(),
        kind,
    });
    None
}

/// The year decides whether a row is kept, so a missing or fractional year
/// is always reported.
fn parse_year(raw: &str, line: u64, warnings: &mut Vec<ParseWarning>) -> Option<i32> {
    if let Some(year) = raw.parse::<f64>().ok().filter(|v| v.is_finite()).and_then(whole) {
        return Some(year);
    }

    warnings.push(ParseWarning {
        line,
        column: COLUMN_MAP[YEAR].1,
        value: raw.to_string(),
        kind: WarningKind::NotANumber,
    });
    None
}

/// Integer columns are sometimes exported as `2018.0`.
fn whole(v: f64) -> Option<i32> {
    if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}
