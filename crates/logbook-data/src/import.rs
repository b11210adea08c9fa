//! Import pipeline: normalise, validate, aggregate.
//!
//! Only file-level problems fail an import. Row-level problems are recorded
//! on the affected entries and the import still returns a complete
//! [`ImportResult`].

use std::path::Path;

use logbook_core::aircraft_types::AircraftTypeVocabulary;
use logbook_core::config::ImportConfig;
use logbook_core::error::Result;
use logbook_core::models::{FlightEntry, ImportMetadata, ImportResult};
use tracing::info;

use crate::aggregator::LogbookAggregator;
use crate::normalizer::{normalize, read_logbook_text};
use crate::rules::RuleEngine;

// ── Public types ──────────────────────────────────────────────────────────────

/// Per-import inputs besides the content itself.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Name of the uploaded file, passed through to the result.
    pub filename: Option<String>,
    /// Passed through to the result; does not change validation.
    pub student_pilot: bool,
    pub config: ImportConfig,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full import pipeline over decoded export text.
///
/// 1. Normalise the text into raw rows.
/// 2. Validate each row into a [`FlightEntry`].
/// 3. Sort, attach running totals and compute statistics.
/// 4. Assemble the [`ImportResult`].
pub fn import_logbook(
    content: &str,
    options: &ImportOptions,
    vocabulary: &AircraftTypeVocabulary,
) -> Result<ImportResult> {
    let config = &options.config;

    // ── Step 1: Normalise ─────────────────────────────────────────────────────
    let normalized = normalize(content, &config.normalizer)?;

    // ── Step 2: Validate ──────────────────────────────────────────────────────
    let engine = RuleEngine::new(vocabulary, &config.validation);
    let mut error_count = 0usize;
    let entries: Vec<FlightEntry> = normalized
        .rows
        .iter()
        .map(|row| engine.validate_row(row, &mut error_count))
        .collect();
    let warning_count = entries.iter().filter(|e| e.has_warnings()).count();
    let rows_read = entries.len();

    // ── Step 3: Aggregate ─────────────────────────────────────────────────────
    let aggregation = LogbookAggregator::aggregate(entries, &config.stats);

    // ── Step 4: Build result ──────────────────────────────────────────────────
    info!(
        "Imported {} entries ({} with errors, {} with warnings, {} skipped)",
        rows_read,
        error_count,
        warning_count,
        normalized.skipped.len()
    );

    Ok(ImportResult {
        entries: aggregation.entries,
        all_time: aggregation.all_time,
        current_period: aggregation.current_period,
        recent: aggregation.recent,
        aircraft_stats: aggregation.aircraft_stats,
        error_count,
        warning_count,
        metadata: ImportMetadata {
            original_filename: options.filename.clone(),
            student_pilot: options.student_pilot,
            rows_read,
            skipped_rows: normalized.skipped,
        },
    })
}

/// Read `path` and import it. The file name is used as the original filename
/// unless `options` already names one.
pub fn import_logbook_file(
    path: &Path,
    options: &ImportOptions,
    vocabulary: &AircraftTypeVocabulary,
) -> Result<ImportResult> {
    let content = read_logbook_text(path, &options.config.normalizer)?;
    let mut options = options.clone();
    if options.filename.is_none() {
        options.filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
    }
    import_logbook(&content, &options, vocabulary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
