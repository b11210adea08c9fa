use clap::Parser;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Import a flight logbook export and report totals and data-quality issues
#[derive(Parser, Debug, Clone)]
#[command(
    name = "logbook-import",
    about = "Import a flight logbook export and report totals and data-quality issues",
    version
)]
pub struct Settings {
    /// Logbook export (CSV) to import
    #[arg(required_unless_present = "list_types")]
    pub file: Option<PathBuf>,

    /// Print the aircraft type vocabulary (optionally one manufacturer) and exit
    #[arg(long, value_name = "MANUFACTURER", num_args = 0..=1, default_missing_value = "")]
    pub list_types: Option<String>,

    /// Mark the import as belonging to a student pilot
    #[arg(long)]
    pub student_pilot: bool,

    /// JSON file with import configuration
    #[arg(long, env = "LOGBOOK_IMPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Length of the recent-experience window in days
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=3650))]
    pub recent_days: Option<u32>,

    /// Date the statistics windows end on
    #[arg(long, value_parser = ["latest-entry", "processing-date"])]
    pub anchor: Option<String>,

    /// Handling of rows whose column count disagrees with the header
    #[arg(long, value_parser = ["best-effort", "skip-row", "abort"])]
    pub column_policy: Option<String>,

    /// Processing date (YYYY-MM-DD) used instead of today
    #[arg(long)]
    pub as_of: Option<String>,

    /// Output format
    #[arg(long, default_value = "summary", value_parser = ["summary", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Build the pipeline configuration: the `--config` file (or defaults)
    /// with command-line overrides applied on top.
    pub fn import_config(&self) -> Result<ImportConfig> {
        let mut config = match &self.config {
            Some(path) => ImportConfig::load_from(path)?,
            None => ImportConfig::default(),
        };

        if let Some(days) = self.recent_days {
            config.stats.recent_window_days = days;
        }
        if let Some(anchor) = &self.anchor {
            config.stats.anchor = anchor.parse()?;
        }
        if let Some(policy) = &self.column_policy {
            config.normalizer.column_policy = policy.parse()?;
        }
        if let Some(as_of) = &self.as_of {
            let date = NaiveDate::parse_from_str(as_of, "%Y-%m-%d")
                .map_err(|e| ImportError::Config(format!("--as-of '{}': {}", as_of, e)))?;
            config.stats.processing_date = Some(date);
            config.validation.reference_date = Some(date);
        }

        config.validate()?;
        Ok(config)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnPolicy, WindowAnchor, RECENT_EXPERIENCE_DAYS};
    use tempfile::TempDir;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["logbook-import", "flights.csv"]);

        assert_eq!(settings.file, Some(PathBuf::from("flights.csv")));
        assert!(settings.list_types.is_none());
        assert!(!settings.student_pilot);
        assert!(settings.config.is_none());
        assert!(settings.recent_days.is_none());
        assert_eq!(settings.format, "summary");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_list_types_without_file() {
        let all = Settings::load_from_args(["logbook-import", "--list-types"]);
        assert_eq!(all.list_types.as_deref(), Some(""));
        assert!(all.file.is_none());

        let cessna = Settings::load_from_args(["logbook-import", "--list-types", "Cessna"]);
        assert_eq!(cessna.list_types.as_deref(), Some("Cessna"));
    }

    #[test]
    fn test_settings_file_required_otherwise() {
        assert!(Settings::try_parse_from(["logbook-import"]).is_err());
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["logbook-import", "f.csv", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_import_config_defaults() {
        let settings = Settings::load_from_args(["logbook-import", "f.csv"]);
        let config = settings.import_config().unwrap();
        assert_eq!(config.stats.recent_window_days, RECENT_EXPERIENCE_DAYS);
        assert_eq!(config.normalizer.column_policy, ColumnPolicy::BestEffort);
    }

    #[test]
    fn test_import_config_cli_overrides() {
        let settings = Settings::load_from_args([
            "logbook-import",
            "f.csv",
            "--recent-days",
            "30",
            "--anchor",
            "processing-date",
            "--column-policy",
            "skip-row",
            "--as-of",
            "2024-06-30",
        ]);
        let config = settings.import_config().unwrap();
        assert_eq!(config.stats.recent_window_days, 30);
        assert_eq!(config.stats.anchor, WindowAnchor::ProcessingDate);
        assert_eq!(config.normalizer.column_policy, ColumnPolicy::SkipRow);
        assert_eq!(config.stats.processing_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(config.validation.reference_date, NaiveDate::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn test_import_config_cli_wins_over_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("import.json");
        std::fs::write(&path, r#"{"stats": {"recent_window_days": 30}}"#).expect("write");

        let file_only =
            Settings::load_from_args(["logbook-import", "f.csv", "--config", path.to_str().unwrap()]);
        assert_eq!(file_only.import_config().unwrap().stats.recent_window_days, 30);

        let overridden = Settings::load_from_args([
            "logbook-import",
            "f.csv",
            "--config",
            path.to_str().unwrap(),
            "--recent-days",
            "60",
        ]);
        assert_eq!(overridden.import_config().unwrap().stats.recent_window_days, 60);
    }

    #[test]
    fn test_import_config_bad_as_of() {
        let settings = Settings::load_from_args(["logbook-import", "f.csv", "--as-of", "June"]);
        assert!(matches!(settings.import_config(), Err(ImportError::Config(_))));
    }

    #[test]
    fn test_settings_rejects_unknown_policy() {
        let result = Settings::try_parse_from(["logbook-import", "f.csv", "--column-policy", "guess"]);
        assert!(result.is_err());
    }
}
