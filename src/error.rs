//! Error and warning types shared by the load and analysis stages.

use std::fmt;
use thiserror::Error;

/// Fatal conditions that abort a run before any output is written.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Required column '{column}' is missing from the dataset")]
    Schema { column: String },

    #[error("No rows found where carrier_lg == '{carrier}'. Try a different carrier code.")]
    NoData { carrier: String },

    #[error("Carrier code must not be empty")]
    EmptyCarrier,

    #[error("Route '{route}' has aggregates but no revenue trend")]
    MissingTrend { route: String },

    #[error("Invalid year range: year_min {min} is after year_max {max}")]
    InvalidYearRange { min: i32, max: i32 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a field value was replaced by a null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    NotANumber,
    OutOfRange,
}

/// A non-fatal field problem. The offending value becomes `None` and the row is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    /// 1-based line in the source file, header included.
    pub line: u64,
    pub column: &'static str,
    pub value: String,
    pub kind: WarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.kind {
            WarningKind::NotANumber => "not a number",
            WarningKind::OutOfRange => "out of range",
        };
        write!(
            f,
            "line {}: {} value '{}' is {}, treated as missing",
            self.line, self.column, self.value, reason
        )
    }
}
