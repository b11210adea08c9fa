//! Tunable limits and windows for the import pipeline.
//!
//! Every threshold the pipeline uses is a named field here with a named
//! default, so that behaviour which differed between exporter versions is a
//! configuration choice rather than a literal buried in the code.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aircraft_types::{MAX_SUGGESTIONS, SUGGESTION_THRESHOLD};
use crate::error::{ImportError, Result};

/// Default trailing window for the recent-experience bucket, in days.
pub const RECENT_EXPERIENCE_DAYS: u32 = 90;
/// Default maximum input size in bytes (16 MiB).
pub const MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;
/// Default maximum characters on one line.
pub const MAX_LINE_LENGTH: usize = 4096;
/// Allowed deviation between day + night and total time, in hours.
pub const TIME_SUM_TOLERANCE: f64 = 0.05;
/// Flights shorter than this (but non-zero) are flagged as implausible.
pub const MIN_PLAUSIBLE_FLIGHT_TIME: f64 = 0.3;
/// Allowed deviation between PIC + dual received and total time, in hours.
pub const TIME_ACCOUNTING_TOLERANCE: f64 = 0.1;
/// Largest landing count accepted in one cell.
pub const MAX_LANDINGS_PER_ENTRY: u32 = 100;

// ── ColumnPolicy ──────────────────────────────────────────────────────────────

/// What to do with a data row whose column count disagrees with the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnPolicy {
    /// Align by position, treat missing cells as empty, and flag the row.
    #[default]
    BestEffort,
    /// Leave the row out of the import and list it in the result metadata.
    SkipRow,
    /// Fail the whole import.
    Abort,
}

impl FromStr for ColumnPolicy {
    type Err = ImportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "best-effort" | "besteffort" => Ok(ColumnPolicy::BestEffort),
            "skip-row" | "skip" => Ok(ColumnPolicy::SkipRow),
            "abort" => Ok(ColumnPolicy::Abort),
            other => Err(ImportError::Config(format!("unknown column policy: {}", other))),
        }
    }
}

// ── WindowAnchor ──────────────────────────────────────────────────────────────

/// The date the current-period and recent-experience windows end on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowAnchor {
    /// The latest dated entry in the logbook.
    #[default]
    LatestEntry,
    /// The processing date (`StatsConfig::processing_date`, or today).
    ProcessingDate,
}

impl FromStr for WindowAnchor {
    type Err = ImportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "latest-entry" | "latest" => Ok(WindowAnchor::LatestEntry),
            "processing-date" | "today" => Ok(WindowAnchor::ProcessingDate),
            other => Err(ImportError::Config(format!("unknown window anchor: {}", other))),
        }
    }
}

// ── Section configs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub max_input_bytes: usize,
    pub max_line_length: usize,
    pub column_policy: ColumnPolicy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: MAX_INPUT_BYTES,
            max_line_length: MAX_LINE_LENGTH,
            column_policy: ColumnPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub time_sum_tolerance: f64,
    pub time_accounting_tolerance: f64,
    pub min_plausible_flight_time: f64,
    /// Landing cells above this are rejected as invalid numbers.
    pub max_landings_per_entry: u32,
    /// Most "did you mean" codes offered for an unknown aircraft type.
    pub max_type_suggestions: usize,
    /// Similarity a code must exceed to be offered.
    pub type_suggestion_threshold: f64,
    /// Entries dated after this are errors. `None` means today.
    pub reference_date: Option<NaiveDate>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            time_sum_tolerance: TIME_SUM_TOLERANCE,
            time_accounting_tolerance: TIME_ACCOUNTING_TOLERANCE,
            min_plausible_flight_time: MIN_PLAUSIBLE_FLIGHT_TIME,
            max_landings_per_entry: MAX_LANDINGS_PER_ENTRY,
            max_type_suggestions: MAX_SUGGESTIONS,
            type_suggestion_threshold: SUGGESTION_THRESHOLD,
            reference_date: None,
        }
    }
}

impl ValidationConfig {
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub recent_window_days: u32,
    pub anchor: WindowAnchor,
    /// Used by [`WindowAnchor::ProcessingDate`]. `None` means today.
    pub processing_date: Option<NaiveDate>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            recent_window_days: RECENT_EXPERIENCE_DAYS,
            anchor: WindowAnchor::default(),
            processing_date: None,
        }
    }
}

impl StatsConfig {
    pub fn processing_date(&self) -> NaiveDate {
        self.processing_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

// ── ImportConfig ──────────────────────────────────────────────────────────────

/// All pipeline settings. Missing keys in a config file take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub normalizer: NormalizerConfig,
    pub validation: ValidationConfig,
    pub stats: StatsConfig,
}

impl ImportConfig {
    /// Load a JSON config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ImportError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ImportConfig = serde_json::from_str(&content)
            .map_err(|e| ImportError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        debug!("Loaded import config from {}", path.display());
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.normalizer.max_line_length == 0 {
            return Err(ImportError::Config(
                "max_line_length must be positive".to_string(),
            ));
        }
        if self.normalizer.max_input_bytes == 0 {
            return Err(ImportError::Config(
                "max_input_bytes must be positive".to_string(),
            ));
        }
        if self.stats.recent_window_days == 0 {
            return Err(ImportError::Config(
                "recent_window_days must be positive".to_string(),
            ));
        }
        if !(self.validation.time_sum_tolerance >= 0.0) {
            return Err(ImportError::Config(
                "time_sum_tolerance must be non-negative".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.validation.type_suggestion_threshold) {
            return Err(ImportError::Config(
                "type_suggestion_threshold must be in 0.0..1.0".to_string(),
            ));
        }
        if !(self.validation.time_accounting_tolerance >= 0.0) {
            return Err(ImportError::Config(
                "time_accounting_tolerance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
