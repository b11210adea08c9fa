//! Tabular normalisation of raw logbook exports.
//!
//! Turns the decoded text of one export into [`RawRow`]s keyed by canonical
//! field. Handles byte-order marks, mixed line endings, quoted cells,
//! ForeFlight section markers and the optional aircraft table that precedes
//! the flights table.

use std::collections::HashMap;
use std::path::Path;

use logbook_core::config::{ColumnPolicy, NormalizerConfig};
use logbook_core::error::{ImportError, Result};
use logbook_core::models::SkippedRow;
use logbook_core::schema::{normalize_header, Field, HeaderMap, RawRow};
use tracing::{debug, info, warn};

/// Fields a flight row inherits from the aircraft table when left empty.
const PROFILE_FIELDS: [Field; 5] = [
    Field::AircraftType,
    Field::CategoryClass,
    Field::GearType,
    Field::Complex,
    Field::HighPerformance,
];

const AIRCRAFT_SECTION: &str = "aircrafttable";
const FLIGHTS_SECTION: &str = "flightstable";

// ── Output ────────────────────────────────────────────────────────────────────

/// Result of normalising one export.
#[derive(Debug, Clone)]
pub struct NormalizedLogbook {
    /// The resolved flights-table header.
    pub header: HeaderMap,
    /// Data rows in file order.
    pub rows: Vec<RawRow>,
    /// Rows excluded under [`ColumnPolicy::SkipRow`].
    pub skipped: Vec<SkippedRow>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read a logbook export from disk and return its text.
///
/// Invalid UTF-8 is replaced rather than rejected; a warning is logged when
/// that happens.
pub fn read_logbook_text(path: &Path, config: &NormalizerConfig) -> Result<String> {
    let metadata = std::fs::metadata(path).map_err(|source| ImportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(ImportError::NotAFile(path.to_path_buf()));
    }
    let size = metadata.len() as usize;
    if size > config.max_input_bytes {
        return Err(ImportError::InputTooLarge {
            size,
            limit: config.max_input_bytes,
        });
    }

    let bytes = std::fs::read(path).map_err(|source| ImportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "{} is not valid UTF-8; undecodable bytes were replaced",
                path.display()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    debug!("Read {} bytes from {}", size, path.display());
    Ok(text)
}

/// Read and normalise a logbook export from disk.
pub fn read_logbook(path: &Path, config: &NormalizerConfig) -> Result<NormalizedLogbook> {
    let text = read_logbook_text(path, config)?;
    normalize(&text, config)
}

/// Normalise the decoded text of one export.
pub fn normalize(content: &str, config: &NormalizerConfig) -> Result<NormalizedLogbook> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    if content.len() > config.max_input_bytes {
        return Err(ImportError::InputTooLarge {
            size: content.len(),
            limit: config.max_input_bytes,
        });
    }
    if content.trim().is_empty() {
        return Err(ImportError::EmptyInput);
    }

    let text = normalize_line_endings(content);
    check_lines(&text, config.max_line_length)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut state = SectionState::Seeking;
    let mut flight_header: Option<HeaderMap> = None;
    let mut profiles: HashMap<String, RawRow> = HashMap::new();
    let mut rows: Vec<RawRow> = Vec::new();
    let mut skipped: Vec<SkippedRow> = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let cells: Vec<&str> = record.iter().collect();

        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        if let Some(section) = section_marker(&cells) {
            debug!("Line {}: start of {} section", line, section);
            state = SectionState::Seeking;
            continue;
        }

        match &state {
            SectionState::Seeking => {
                let header = HeaderMap::resolve(cells.iter().copied());
                if header.is_flight_header() {
                    debug!(
                        "Line {}: flights header with {} recognised columns",
                        line,
                        header.recognized().count()
                    );
                    flight_header = Some(header.clone());
                    state = SectionState::Flights(header);
                } else if header.is_aircraft_header() {
                    debug!("Line {}: aircraft table header", line);
                    state = SectionState::Aircraft(header);
                } else {
                    debug!("Line {}: skipping preamble row", line);
                }
            }
            SectionState::Aircraft(header) => {
                let candidate = HeaderMap::resolve(cells.iter().copied());
                if candidate.is_flight_header() {
                    flight_header = Some(candidate.clone());
                    state = SectionState::Flights(candidate);
                    continue;
                }
                let profile = header.build_row(line, cells.iter().copied());
                if let Some(key) = profile.value(Field::Registration).map(registration_key) {
                    profiles.entry(key).or_insert(profile);
                }
            }
            SectionState::Flights(header) => {
                if HeaderMap::resolve(cells.iter().copied()) == *header {
                    debug!("Line {}: skipping repeated header row", line);
                    continue;
                }

                let mut row = header.build_row(line, cells.iter().copied());
                if let Some(mismatch) = column_mismatch(header, &cells) {
                    match config.column_policy {
                        ColumnPolicy::BestEffort => {
                            debug!("Line {}: {}", line, mismatch.describe());
                            row.structural_note = Some(mismatch.describe());
                        }
                        ColumnPolicy::SkipRow => {
                            warn!("Skipping line {}: {}", line, mismatch.describe());
                            skipped.push(SkippedRow {
                                line,
                                reason: mismatch.describe(),
                            });
                            continue;
                        }
                        ColumnPolicy::Abort => {
                            return Err(ImportError::ColumnCountMismatch {
                                line,
                                expected: mismatch.expected,
                                found: mismatch.found,
                            });
                        }
                    }
                }

                apply_profile(&mut row, &profiles);
                rows.push(row);
            }
        }
    }

    let header = flight_header.ok_or(ImportError::NoRecognizableHeader)?;
    if rows.is_empty() && skipped.is_empty() {
        return Err(ImportError::HeaderOnly);
    }

    info!(
        "Normalized {} rows ({} skipped, {} aircraft profiles)",
        rows.len(),
        skipped.len(),
        profiles.len()
    );

    Ok(NormalizedLogbook {
        header,
        rows,
        skipped,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

enum SectionState {
    /// Waiting for a header row.
    Seeking,
    Aircraft(HeaderMap),
    Flights(HeaderMap),
}

struct ColumnMismatch {
    expected: usize,
    found: usize,
}

impl ColumnMismatch {
    fn describe(&self) -> String {
        format!(
            "row has {} columns but the header declares {}",
            self.found, self.expected
        )
    }
}

/// Convert `\r\n` and lone `\r` to `\n`.
fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Reject NUL and other control bytes, and over-long lines.
fn check_lines(text: &str, max_line_length: usize) -> Result<()> {
    for (index, line) in text.split('\n').enumerate() {
        let line_no = index + 1;
        for byte in line.bytes() {
            match byte {
                0 => return Err(ImportError::NullByteDetected { line: line_no }),
                b'\t' => {}
                0x01..=0x1F | 0x7F => {
                    return Err(ImportError::ControlByte {
                        line: line_no,
                        byte,
                    })
                }
                _ => {}
            }
        }
        let length = line.chars().count();
        if length > max_line_length {
            return Err(ImportError::LineTooLong {
                line: line_no,
                length,
                limit: max_line_length,
            });
        }
    }
    Ok(())
}

/// `Some(name)` when the record is a lone section marker cell.
fn section_marker<'a>(cells: &[&'a str]) -> Option<&'a str> {
    let (first, rest) = cells.split_first()?;
    if !rest.iter().all(|c| c.is_empty()) {
        return None;
    }
    match normalize_header(first).as_str() {
        AIRCRAFT_SECTION | FLIGHTS_SECTION => Some(*first),
        _ => None,
    }
}

/// Compare a record against the header, ignoring trailing empty padding.
fn column_mismatch(header: &HeaderMap, cells: &[&str]) -> Option<ColumnMismatch> {
    let expected = header.width();
    let found = cells.len();
    let used = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);

    let too_many = used > expected;
    let too_few = found < header.significant_width();
    if too_many || too_few {
        Some(ColumnMismatch { expected, found })
    } else {
        None
    }
}

fn registration_key(registration: &str) -> String {
    registration.trim().to_uppercase()
}

fn apply_profile(row: &mut RawRow, profiles: &HashMap<String, RawRow>) {
    let Some(registration) = row.value(Field::Registration) else {
        return;
    };
    let Some(profile) = profiles.get(&registration_key(registration)) else {
        return;
    };
    for field in PROFILE_FIELDS {
        if !row.is_present(field) {
            if let Some(value) = profile.value(field) {
                row.set(field, value);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const FOREFLIGHT: &str = "ForeFlight Logbook Import,This row is required,,,,\n\
        ,,,,,\n\
        Aircraft Table,,,,,\n\
        AircraftID,TypeCode,Make,GearType,aircraftClass (FAA),complexAircraft (FAA)\n\
        N125CM,CH7A,Bellanca,fixed_tailwheel,airplane_single_engine_land,\n\
        N198JJ,BE36,Beechcraft,fixed_tricycle,airplane_single_engine_land,TRUE\n\
        ,,,,,\n\
        Flights Table,,,,,\n\
        Date,AircraftID,From,To,TotalTime,Night\n\
        2023-01-01,N125CM,KOAK,KSFO,2.0,0.0\n\
        2023-01-02,n198jj,KSFO,KOAK,1.5,0.5\n";

    fn config() -> NormalizerConfig {
        NormalizerConfig::default()
    }

    // ── basic parsing ────────────────────────────────────────────────────────

    #[test]
    fn test_simple_csv_with_synonyms() {
        let text = "Flight Date,Tail Number,Type,Total Time\n2024-01-01,N172ST,C172,1.5\n";
        let out = normalize(text, &config()).unwrap();
        assert_eq!(out.rows.len(), 1);
        let row = &out.rows[0];
        assert_eq!(row.line, 2);
        assert_eq!(row.get(Field::Date), "2024-01-01");
        assert_eq!(row.get(Field::Registration), "N172ST");
        assert_eq!(row.get(Field::AircraftType), "C172");
        assert_eq!(row.get(Field::TotalTime), "1.5");
    }

    #[test]
    fn test_header_order_independent() {
        let text = "TotalTime,AircraftID,Date\n1.2,N1,2024-02-02\n";
        let out = normalize(text, &config()).unwrap();
        assert_eq!(out.rows[0].get(Field::TotalTime), "1.2");
        assert_eq!(out.rows[0].get(Field::Date), "2024-02-02");
    }

    #[test]
    fn test_bom_and_mixed_line_endings() {
        let text = "\u{feff}Date,AircraftID,TotalTime\r\n2024-01-01,N1,1.0\r2024-01-02,N2,2.0\n";
        let out = normalize(text, &config()).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[1].get(Field::Registration), "N2");
        assert_eq!(out.rows[1].line, 3);
    }

    #[test]
    fn test_quoted_delimiter_and_whitespace() {
        let text = "Date,AircraftID,TotalTime,Remarks\n2024-01-01,  N1 ,1.0,\"pattern work, 3 landings\"\n";
        let out = normalize(text, &config()).unwrap();
        let row = &out.rows[0];
        assert_eq!(row.get(Field::Registration), "N1");
        assert_eq!(row.get(Field::Remarks), "pattern work, 3 landings");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let text = "Date,AircraftID,TotalTime\n\n2024-01-01,N1,1.0\n,,\n\n2024-01-02,N1,1.0\n";
        let out = normalize(text, &config()).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[1].line, 6);
    }

    // ── fatal errors ─────────────────────────────────────────────────────────

    #[test]
    fn test_empty_input() {
        assert!(matches!(normalize("", &config()), Err(ImportError::EmptyInput)));
        assert!(matches!(
            normalize(" \n\r\n ", &config()),
            Err(ImportError::EmptyInput)
        ));
        assert!(matches!(
            normalize("\u{feff}", &config()),
            Err(ImportError::EmptyInput)
        ));
    }

    #[test]
    fn test_header_only() {
        let result = normalize("Date,AircraftID,TotalTime\n\n", &config());
        assert!(matches!(result, Err(ImportError::HeaderOnly)));
    }

    #[test]
    fn test_no_recognizable_header() {
        let result = normalize("foo,bar,baz\n1,2,3\n", &config());
        assert!(matches!(result, Err(ImportError::NoRecognizableHeader)));
    }

    #[test]
    fn test_null_byte_rejected_with_line() {
        let text = "Date,AircraftID,TotalTime\n2024-01-01,N1\0,1.0\n";
        match normalize(text, &config()) {
            Err(ImportError::NullByteDetected { line }) => assert_eq!(line, 2),
            other => panic!("unexpected: {:?}", other.map(|n| n.rows.len())),
        }
    }

    #[test]
    fn test_control_byte_rejected() {
        let text = "Date,AircraftID,TotalTime\n2024-01-01,N1\u{7},1.0\n";
        match normalize(text, &config()) {
            Err(ImportError::ControlByte { line, byte }) => {
                assert_eq!(line, 2);
                assert_eq!(byte, 0x07);
            }
            other => panic!("unexpected: {:?}", other.map(|n| n.rows.len())),
        }
    }

    #[test]
    fn test_delete_byte_rejected() {
        let text = "Date,AircraftID,TotalTime\n2024-01-01,N1,1.0\n2024-01-02,N2\u{7f},1.0\n";
        match normalize(text, &config()) {
            Err(ImportError::ControlByte { line, byte }) => {
                assert_eq!(line, 3);
                assert_eq!(byte, 0x7F);
            }
            other => panic!("unexpected: {:?}", other.map(|n| n.rows.len())),
        }
    }

    #[test]
    fn test_tab_is_allowed() {
        let text = "Date,AircraftID,TotalTime\n2024-01-01,\tN1,1.0\n";
        let out = normalize(text, &config()).unwrap();
        assert_eq!(out.rows[0].get(Field::Registration), "N1");
    }

    #[test]
    fn test_line_too_long() {
        let cfg = NormalizerConfig {
            max_line_length: 30,
            ..NormalizerConfig::default()
        };
        let text = format!("Date,AircraftID,TotalTime\n2024-01-01,N1,1.0,{}\n", "x".repeat(30));
        assert!(matches!(
            normalize(&text, &cfg),
            Err(ImportError::LineTooLong { line: 2, limit: 30, .. })
        ));
    }

    #[test]
    fn test_input_too_large() {
        let cfg = NormalizerConfig {
            max_input_bytes: 10,
            ..NormalizerConfig::default()
        };
        let result = normalize("Date,AircraftID,TotalTime\n", &cfg);
        assert!(matches!(result, Err(ImportError::InputTooLarge { limit: 10, .. })));
    }

    // ── column policy ────────────────────────────────────────────────────────

    const RAGGED: &str = "Date,AircraftID,TotalTime,Night\n\
        2024-01-01,N1,1.0,0.0\n\
        2024-01-02,N1\n\
        2024-01-03,N1,1.0,0.0,surplus\n";

    #[test]
    fn test_best_effort_keeps_rows_with_note() {
        let out = normalize(RAGGED, &config()).unwrap();
        assert_eq!(out.rows.len(), 3);
        assert!(out.rows[0].structural_note.is_none());
        assert!(out.rows[1].structural_note.is_some());
        assert_eq!(out.rows[1].get(Field::TotalTime), "");
        assert!(out.rows[2].structural_note.is_some());
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn test_skip_row_lists_skipped_lines() {
        let cfg = NormalizerConfig {
            column_policy: ColumnPolicy::SkipRow,
            ..NormalizerConfig::default()
        };
        let out = normalize(RAGGED, &cfg).unwrap();
        assert_eq!(out.rows.len(), 1);
        let lines: Vec<usize> = out.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn test_abort_policy_fails() {
        let cfg = NormalizerConfig {
            column_policy: ColumnPolicy::Abort,
            ..NormalizerConfig::default()
        };
        assert!(matches!(
            normalize(RAGGED, &cfg),
            Err(ImportError::ColumnCountMismatch {
                line: 3,
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn test_trailing_padding_is_not_a_mismatch() {
        let text = "Date,AircraftID,TotalTime,,,\n2024-01-01,N1,1.0,,,,,,,\n2024-01-02,N1,1.0\n";
        let out = normalize(text, &config()).unwrap();
        assert!(out.rows.iter().all(|r| r.structural_note.is_none()));
    }

    // ── ForeFlight sections ──────────────────────────────────────────────────

    #[test]
    fn test_foreflight_sections_and_profile_join() {
        let out = normalize(FOREFLIGHT, &config()).unwrap();
        assert_eq!(out.rows.len(), 2);

        let first = &out.rows[0];
        assert_eq!(first.get(Field::AircraftType), "CH7A");
        assert_eq!(first.get(Field::GearType), "fixed_tailwheel");
        assert_eq!(first.get(Field::CategoryClass), "airplane_single_engine_land");
        assert_eq!(first.line, 10);

        // Registration lookup is case-insensitive.
        let second = &out.rows[1];
        assert_eq!(second.get(Field::AircraftType), "BE36");
        assert_eq!(second.get(Field::Complex), "TRUE");
    }

    #[test]
    fn test_aircraft_table_without_flights_table() {
        let text = "Aircraft Table,,\nAircraftID,TypeCode,GearType\nN1,C172,fixed_tricycle\n";
        assert!(matches!(
            normalize(text, &config()),
            Err(ImportError::NoRecognizableHeader)
        ));
    }

    // ── read_logbook ─────────────────────────────────────────────────────────

    #[test]
    fn test_read_logbook_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logbook.csv");
        std::fs::write(&path, FOREFLIGHT).unwrap();
        let out = read_logbook(&path, &config()).unwrap();
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn test_read_logbook_rejects_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_logbook(dir.path(), &config()),
            Err(ImportError::NotAFile(_))
        ));
    }

    #[test]
    fn test_read_logbook_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_logbook(&dir.path().join("absent.csv"), &config());
        assert!(matches!(result, Err(ImportError::FileRead { .. })));
    }

    #[test]
    fn test_read_logbook_invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"Date,AircraftID,TotalTime,Remarks\n2024-01-01,N1,1.0,caf\xe9\n")
            .unwrap();
        drop(file);
        let out = read_logbook(&path, &config()).unwrap();
        assert_eq!(out.rows[0].get(Field::Remarks), "caf\u{fffd}");
    }

    #[test]
    fn test_read_logbook_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.csv");
        std::fs::write(&path, "Date,AircraftID,TotalTime\n2024-01-01,N1,1.0\n").unwrap();
        let cfg = NormalizerConfig {
            max_input_bytes: 8,
            ..NormalizerConfig::default()
        };
        assert!(matches!(
            read_logbook(&path, &cfg),
            Err(ImportError::InputTooLarge { .. })
        ));
    }
}
