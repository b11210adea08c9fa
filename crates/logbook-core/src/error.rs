use std::path::PathBuf;
use thiserror::Error;

/// Unrecoverable import failures.
///
/// Any of these aborts the whole import before a single entry is produced.
/// Row-level problems are never reported through this type; they travel as
/// [`crate::models::ValidationIssue`] values on the entry instead.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The input contained no non-whitespace content.
    #[error("Logbook file is empty")]
    EmptyInput,

    /// A header row was found but no data rows follow it.
    #[error("Logbook file contains a header row but no flight entries")]
    HeaderOnly,

    /// No row could be matched against the known column names.
    #[error("No recognizable logbook header found (expected columns such as Date, AircraftID, TotalTime)")]
    NoRecognizableHeader,

    /// An embedded NUL byte was found.
    #[error("Null byte detected on line {line}")]
    NullByteDetected { line: usize },

    /// A control byte other than tab or a line terminator was found.
    #[error("Disallowed control byte 0x{byte:02X} on line {line}")]
    ControlByte { line: usize, byte: u8 },

    /// A single line exceeded the configured maximum length.
    #[error("Line {line} is {length} characters long (limit {limit})")]
    LineTooLong {
        line: usize,
        length: usize,
        limit: usize,
    },

    /// The whole input exceeded the configured maximum size.
    #[error("Logbook input is {size} bytes (limit {limit})")]
    InputTooLarge { size: usize, limit: usize },

    /// A row's column count disagreed with the header under the abort policy.
    #[error("Line {line} has {found} columns, header declares {expected}")]
    ColumnCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The given path is a directory or other non-file object.
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV tokenizer rejected the input.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the logbook crates.
pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ImportError::FileRead {
            path: PathBuf::from("/some/logbook.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/logbook.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_empty_input() {
        assert_eq!(ImportError::EmptyInput.to_string(), "Logbook file is empty");
    }

    #[test]
    fn test_error_display_header_only() {
        let msg = ImportError::HeaderOnly.to_string();
        assert!(msg.contains("no flight entries"));
    }

    #[test]
    fn test_error_display_null_byte() {
        let err = ImportError::NullByteDetected { line: 2 };
        assert_eq!(err.to_string(), "Null byte detected on line 2");
    }

    #[test]
    fn test_error_display_control_byte() {
        let err = ImportError::ControlByte { line: 3, byte: 0x07 };
        assert_eq!(err.to_string(), "Disallowed control byte 0x07 on line 3");
    }

    #[test]
    fn test_error_display_line_too_long() {
        let err = ImportError::LineTooLong {
            line: 2,
            length: 10_050,
            limit: 4096,
        };
        assert_eq!(
            err.to_string(),
            "Line 2 is 10050 characters long (limit 4096)"
        );
    }

    #[test]
    fn test_error_display_not_a_file() {
        let err = ImportError::NotAFile(PathBuf::from("/tmp/uploads"));
        assert_eq!(err.to_string(), "Not a file: /tmp/uploads");
    }

    #[test]
    fn test_error_display_column_count() {
        let err = ImportError::ColumnCountMismatch {
            line: 4,
            expected: 5,
            found: 3,
        };
        assert_eq!(err.to_string(), "Line 4 has 3 columns, header declares 5");
    }

    #[test]
    fn test_error_display_config() {
        let err = ImportError::Config("recent_window_days must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: recent_window_days must be positive"
        );
    }
}
