//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! environment variables, then command-line flags (applied by the binary).
//!
//! ```json
//! {
//!   "data_path": "data/routes.csv",
//!   "year_min": 2018,
//!   "year_max": 2023,
//!   "carrier": "UA",
//!   "share_threshold": 0.25,
//!   "rev_change_threshold": 0.0,
//!   "output_dir": "outputs"
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analyzers::types::Thresholds;
use crate::error::AnalysisError;

pub const ENV_DATA_PATH: &str = "ROUTE_DATA_PATH";
pub const ENV_CARRIER: &str = "ROUTE_CARRIER";
pub const ENV_OUTPUT_DIR: &str = "ROUTE_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    pub year_min: i32,
    pub year_max: i32,
    pub carrier: String,
    pub share_threshold: f64,
    pub rev_change_threshold: f64,
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let thresholds = Thresholds::default();
        Self {
            data_path: PathBuf::from("data/US Airline Flight Routes and Fares 1993-2024.csv"),
            year_min: 2018,
            year_max: 2023,
            carrier: "UA".to_string(),
            share_threshold: thresholds.share,
            rev_change_threshold: thresholds.rev_change,
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl AnalysisConfig {
    /// Loads a JSON config file. Keys that are absent keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Applies `ROUTE_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_DATA_PATH) {
            self.data_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_CARRIER) {
            self.carrier = v;
        }
        if let Some(v) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            share: self.share_threshold,
            rev_change: self.rev_change_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.year_min > self.year_max {
            return Err(AnalysisError::InvalidYearRange {
                min: self.year_min,
                max: self.year_max,
            });
        }
        if self.carrier.trim().is_empty() {
            return Err(AnalysisError::EmptyCarrier);
        }
        Ok(())
    }

    pub fn route_summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_route_summary.csv", self.carrier))
    }

    pub fn underperforming_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_underperforming_routes.csv", self.carrier))
    }

    pub fn run_report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_run_report.json", self.carrier))
    }
}
