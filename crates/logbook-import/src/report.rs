//! Plain-text rendering of an import result and of the type vocabulary.

use logbook_core::aircraft_types::AircraftTypeVocabulary;
use logbook_core::formatting::{format_hhmm, format_hours, percentage};
use logbook_core::models::{ImportResult, LogbookStats, StatsWindow, TimeCategory};

/// Render the totals, per-aircraft summary and flagged entries.
pub fn render_summary(result: &ImportResult, vocabulary: &AircraftTypeVocabulary) -> String {
    let mut lines: Vec<String> = Vec::new();

    let name = result
        .metadata
        .original_filename
        .as_deref()
        .unwrap_or("logbook");
    lines.push(format!("Logbook: {}", name));
    if result.metadata.student_pilot {
        lines.push("Student pilot logbook".to_string());
    }
    let entries = result.entries.len();
    lines.push(format!(
        "Entries: {}  errors: {} ({}%)  warnings: {}  skipped rows: {}",
        entries,
        result.error_count,
        percentage(result.error_count as f64, entries as f64, 1),
        result.warning_count,
        result.metadata.skipped_rows.len()
    ));

    for stats in [&result.all_time, &result.current_period, &result.recent] {
        lines.push(String::new());
        render_stats(&mut lines, stats);
    }

    if !result.aircraft_stats.is_empty() {
        lines.push(String::new());
        lines.push("Aircraft".to_string());
        for stat in &result.aircraft_stats {
            let model = vocabulary
                .info(&stat.aircraft_type)
                .map(|t| format!("{} {}", t.manufacturer, t.model))
                .unwrap_or_default();
            lines.push(
                format!(
                    "  {:<10} {:<8} {:>4} flights {:>9} h  {}",
                    stat.registration,
                    stat.aircraft_type,
                    stat.flights,
                    format_hours(stat.total_time),
                    model
                )
                .trim_end()
                .to_string(),
            );
        }
    }

    let flagged: Vec<_> = result
        .entries
        .iter()
        .filter(|e| e.has_errors() || e.has_warnings())
        .collect();
    if !flagged.is_empty() {
        lines.push(String::new());
        lines.push("Flagged entries".to_string());
        for entry in flagged {
            let date = entry
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "undated".to_string());
            if let Some(errors) = &entry.error_explanation {
                lines.push(format!("  line {} ({}) error: {}", entry.source_line, date, errors));
            }
            if let Some(warnings) = &entry.warning_explanation {
                lines.push(format!(
                    "  line {} ({}) warning: {}",
                    entry.source_line, date, warnings
                ));
            }
        }
    }

    for skipped in &result.metadata.skipped_rows {
        lines.push(format!("  line {} skipped: {}", skipped.line, skipped.reason));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Render the vocabulary: per-category counts, or one manufacturer's codes
/// when `manufacturer` is non-empty.
pub fn render_vocabulary(vocabulary: &AircraftTypeVocabulary, manufacturer: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    if manufacturer.trim().is_empty() {
        let summary = vocabulary.summary();
        lines.push(format!(
            "Aircraft types: {} codes from {} manufacturers",
            summary.total_codes, summary.manufacturers
        ));
        for (category, count) in &summary.categories {
            lines.push(format!("  {:<24} {:>4}", category, count));
        }
    } else {
        let codes = vocabulary.codes_by_manufacturer(manufacturer.trim());
        if codes.is_empty() {
            lines.push(format!("No aircraft types for manufacturer '{}'", manufacturer.trim()));
        }
        for code in codes {
            if let Some(designator) = vocabulary.info(code) {
                lines.push(format!(
                    "  {:<6} {:<28} {}",
                    code, designator.model, designator.category
                ));
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn window_title(stats: &LogbookStats) -> String {
    let label = match stats.window {
        StatsWindow::AllTime => "All time",
        StatsWindow::CurrentPeriod => "Current period",
        StatsWindow::RecentExperience => "Recent experience",
    };
    match (stats.start, stats.end) {
        (Some(start), Some(end)) => format!("{} ({} to {})", label, start, end),
        _ => label.to_string(),
    }
}

fn render_stats(lines: &mut Vec<String>, stats: &LogbookStats) {
    lines.push(window_title(stats));
    lines.push(format!(
        "  flights: {}  ground sessions: {}  average: {}",
        stats.flight_count,
        stats.ground_sessions,
        format_hhmm(stats.average_flight_time)
    ));
    for category in TimeCategory::ALL {
        lines.push(format!(
            "  {:<22} {:>9}",
            category.label(),
            format_hours(stats.totals.get(category))
        ));
    }
    lines.push(format!(
        "  landings: {} day / {} night",
        stats.landings_day, stats.landings_night
    ));
    lines.push(format!(
        "  ASEL {}  tailwheel {}  complex {}  high performance {}",
        format_hours(stats.asel_time),
        format_hours(stats.tailwheel_time),
        format_hours(stats.complex_time),
        format_hours(stats.high_performance_time)
    ));
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use logbook_core::aircraft_types::TypeDesignator;
    use logbook_data::{import_logbook, ImportOptions};

    fn import(text: &str) -> ImportResult {
        let mut options = ImportOptions {
            filename: Some("flights.csv".to_string()),
            ..ImportOptions::default()
        };
        options.config.validation.reference_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        import_logbook(text, &options, AircraftTypeVocabulary::builtin()).unwrap()
    }

    // ── summary ──────────────────────────────────────────────────────────────

    #[test]
    fn test_summary_lists_totals_and_aircraft() {
        let result =
            import("Date,AircraftID,TypeCode,From,To,TotalTime\n2024-01-01,N172ST,C172,KPAO,KSQL,1.5\n");
        let text = render_summary(&result, AircraftTypeVocabulary::builtin());
        assert!(text.contains("Logbook: flights.csv"));
        assert!(text.contains("Entries: 1  errors: 0 (0%)"));
        assert!(text.contains("N172ST"));
        assert!(text.contains("Cessna 172 Skyhawk"));
        assert!(text.contains("All time"));
        assert!(!text.contains("Flagged entries"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_summary_lists_flagged_entries() {
        let result =
            import("Date,AircraftID,TypeCode,From,To,TotalTime\n2024-01-01,,C172,KPAO,KSQL,1.5\n");
        let text = render_summary(&result, AircraftTypeVocabulary::builtin());
        assert!(text.contains("Flagged entries"));
        assert!(text.contains("line 2 (2024-01-01) error: Missing aircraft registration"));
    }

    // ── vocabulary ───────────────────────────────────────────────────────────

    fn vocabulary() -> AircraftTypeVocabulary {
        AircraftTypeVocabulary::from_entries(vec![
            TypeDesignator::new("C172", "Cessna", "172 Skyhawk", "Light Single-Engine"),
            TypeDesignator::new("C152", "Cessna", "152", "Light Single-Engine"),
            TypeDesignator::new("R44", "Robinson", "R44", "Helicopter"),
        ])
    }

    #[test]
    fn test_vocabulary_summary() {
        let text = render_vocabulary(&vocabulary(), "");
        assert!(text.starts_with("Aircraft types: 3 codes from 2 manufacturers"));
        assert!(text.contains("Helicopter"));
        assert!(text.contains("Light Single-Engine"));
    }

    #[test]
    fn test_vocabulary_by_manufacturer() {
        let text = render_vocabulary(&vocabulary(), "cessna");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("C152"));
        assert!(lines[1].contains("172 Skyhawk"));

        let none = render_vocabulary(&vocabulary(), "Boeing");
        assert!(none.contains("No aircraft types for manufacturer 'Boeing'"));
    }
}
