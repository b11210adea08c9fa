use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ── Aircraft ──────────────────────────────────────────────────────────────────

/// The aircraft a flight was logged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Tail number / registration as written in the export.
    pub registration: String,
    /// Free-text type exactly as the export spelled it (trimmed).
    pub type_text: String,
    /// Vocabulary designator when the type was recognised, otherwise `None`.
    #[serde(default)]
    pub type_designator: Option<String>,
    /// Category/class, e.g. `"airplane_single_engine_land"` or `"ASEL"`.
    #[serde(default)]
    pub category_class: String,
    /// Gear configuration, e.g. `"fixed_tailwheel"`.
    #[serde(default)]
    pub gear_type: Option<String>,
    /// Aircraft is flagged as complex.
    #[serde(default)]
    pub complex: bool,
    /// Aircraft is flagged as high-performance.
    #[serde(default)]
    pub high_performance: bool,
}

impl Aircraft {
    /// Airplane single-engine land, in either the FAA long form or `ASEL`.
    pub fn is_asel(&self) -> bool {
        let class = self.category_class.to_lowercase();
        class.contains("asel") || class.contains("airplane_single_engine_land")
    }

    /// Conventional (tailwheel) landing gear.
    pub fn is_tailwheel(&self) -> bool {
        self.gear_type
            .as_deref()
            .map(|g| {
                let g = g.to_lowercase();
                g.contains("tailwheel") || g.contains("conventional")
            })
            .unwrap_or(false)
    }
}

// ── Time categories ───────────────────────────────────────────────────────────

/// Every time column that is summed into running totals and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCategory {
    TotalTime,
    Pic,
    DualReceived,
    Solo,
    GroundTraining,
    Day,
    Night,
    CrossCountry,
    SimulatedInstrument,
    ActualInstrument,
}

impl TimeCategory {
    pub const ALL: [TimeCategory; 10] = [
        TimeCategory::TotalTime,
        TimeCategory::Pic,
        TimeCategory::DualReceived,
        TimeCategory::Solo,
        TimeCategory::GroundTraining,
        TimeCategory::Day,
        TimeCategory::Night,
        TimeCategory::CrossCountry,
        TimeCategory::SimulatedInstrument,
        TimeCategory::ActualInstrument,
    ];

    /// Human-readable label used in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            TimeCategory::TotalTime => "total time",
            TimeCategory::Pic => "PIC",
            TimeCategory::DualReceived => "dual received",
            TimeCategory::Solo => "solo",
            TimeCategory::GroundTraining => "ground training",
            TimeCategory::Day => "day",
            TimeCategory::Night => "night",
            TimeCategory::CrossCountry => "cross-country",
            TimeCategory::SimulatedInstrument => "simulated instrument",
            TimeCategory::ActualInstrument => "actual instrument",
        }
    }
}

// ── TimeTotals ────────────────────────────────────────────────────────────────

/// Summed hours per [`TimeCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeTotals {
    pub total_time: f64,
    pub pic: f64,
    pub dual_received: f64,
    pub solo: f64,
    pub ground_training: f64,
    pub day: f64,
    pub night: f64,
    pub cross_country: f64,
    pub simulated_instrument: f64,
    pub actual_instrument: f64,
}

/// Cumulative totals attached to an entry, inclusive of that entry.
pub type RunningTotals = TimeTotals;

impl TimeTotals {
    /// Add every category of `entry` to the totals.
    pub fn add_entry(&mut self, entry: &FlightEntry) {
        self.total_time += entry.total_time;
        self.pic += entry.pic;
        self.dual_received += entry.dual_received;
        self.solo += entry.solo;
        self.ground_training += entry.ground_training;
        self.day += entry.day;
        self.night += entry.night;
        self.cross_country += entry.cross_country;
        self.simulated_instrument += entry.simulated_instrument;
        self.actual_instrument += entry.actual_instrument;
    }

    pub fn get(&self, category: TimeCategory) -> f64 {
        match category {
            TimeCategory::TotalTime => self.total_time,
            TimeCategory::Pic => self.pic,
            TimeCategory::DualReceived => self.dual_received,
            TimeCategory::Solo => self.solo,
            TimeCategory::GroundTraining => self.ground_training,
            TimeCategory::Day => self.day,
            TimeCategory::Night => self.night,
            TimeCategory::CrossCountry => self.cross_country,
            TimeCategory::SimulatedInstrument => self.simulated_instrument,
            TimeCategory::ActualInstrument => self.actual_instrument,
        }
    }
}

// ── Validation issues ─────────────────────────────────────────────────────────

/// Severity of a [`ValidationIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Error,
    Warning,
}

/// Identifier of the rule that produced an issue.
///
/// Each rule fires at most once per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    MissingDate,
    InvalidDate,
    FutureDate,
    MissingRegistration,
    MissingAircraftType,
    InvalidNumber,
    NegativeValue,
    ExceedsTotal,
    TimeSumMismatch,
    AmbiguousRole,
    UnknownAircraftType,
    ImplausibleDuration,
    ZeroFlightTime,
    RegistrationFormat,
    ColumnCount,
    MissingAirport,
    TimeAccounting,
    UnrecognizedRole,
}

impl Rule {
    /// Stable kebab-case identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::MissingDate => "missing-date",
            Rule::InvalidDate => "invalid-date",
            Rule::FutureDate => "future-date",
            Rule::MissingRegistration => "missing-registration",
            Rule::MissingAircraftType => "missing-aircraft-type",
            Rule::InvalidNumber => "invalid-number",
            Rule::NegativeValue => "negative-value",
            Rule::ExceedsTotal => "exceeds-total",
            Rule::TimeSumMismatch => "time-sum-mismatch",
            Rule::AmbiguousRole => "ambiguous-role",
            Rule::UnknownAircraftType => "unknown-aircraft-type",
            Rule::ImplausibleDuration => "implausible-duration",
            Rule::ZeroFlightTime => "zero-flight-time",
            Rule::RegistrationFormat => "registration-format",
            Rule::ColumnCount => "column-count",
            Rule::MissingAirport => "missing-airport",
            Rule::TimeAccounting => "time-accounting",
            Rule::UnrecognizedRole => "unrecognized-role",
        }
    }
}

/// One data-quality finding on one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub rule: Rule,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Error,
            rule,
            message: message.into(),
        }
    }

    pub fn warning(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Warning,
            rule,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == IssueKind::Error
    }
}

// ── FlightEntry ───────────────────────────────────────────────────────────────

/// A validated logbook entry.
///
/// Every field is filled in by the rule engine; only `running_totals` is
/// attached later by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightEntry {
    /// 1-based line of the row in the source export.
    pub source_line: usize,
    /// Flight date; `None` when the date was missing or unparseable.
    pub date: Option<NaiveDate>,
    pub aircraft: Aircraft,
    pub departure: Option<String>,
    pub destination: Option<String>,
    /// Block-out time (`TimeOut`), when logged.
    #[serde(default)]
    pub departure_time: Option<NaiveTime>,
    /// Block-in time (`TimeIn`), when logged.
    #[serde(default)]
    pub arrival_time: Option<NaiveTime>,
    /// Route distance in nautical miles.
    #[serde(default)]
    pub distance_nm: Option<f64>,
    pub total_time: f64,
    pub pic: f64,
    pub dual_received: f64,
    #[serde(default)]
    pub dual_given: f64,
    #[serde(default)]
    pub sic: f64,
    pub solo: f64,
    pub ground_training: f64,
    pub day: f64,
    pub night: f64,
    pub cross_country: f64,
    pub simulated_instrument: f64,
    pub actual_instrument: f64,
    pub landings_day: u32,
    pub landings_night: u32,
    /// Explicit role from the export, or the inferred one.
    pub pilot_role: String,
    /// Ground-only instruction with zero flight time.
    #[serde(default)]
    pub is_ground_training: bool,
    pub remarks: Option<String>,
    #[serde(default)]
    pub instructor_comments: Option<String>,
    /// Every issue found, in rule order.
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    /// All error-kind issues joined with `"; "`.
    pub error_explanation: Option<String>,
    /// All warning-kind issues joined with `"; "`.
    pub warning_explanation: Option<String>,
    #[serde(default)]
    pub running_totals: Option<RunningTotals>,
}

impl FlightEntry {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.kind == IssueKind::Warning)
    }

    /// Hours logged in `category` on this entry.
    pub fn time(&self, category: TimeCategory) -> f64 {
        match category {
            TimeCategory::TotalTime => self.total_time,
            TimeCategory::Pic => self.pic,
            TimeCategory::DualReceived => self.dual_received,
            TimeCategory::Solo => self.solo,
            TimeCategory::GroundTraining => self.ground_training,
            TimeCategory::Day => self.day,
            TimeCategory::Night => self.night,
            TimeCategory::CrossCountry => self.cross_country,
            TimeCategory::SimulatedInstrument => self.simulated_instrument,
            TimeCategory::ActualInstrument => self.actual_instrument,
        }
    }

    pub fn total_landings(&self) -> u64 {
        u64::from(self.landings_day) + u64::from(self.landings_night)
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

/// Which time window a [`LogbookStats`] bucket covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsWindow {
    AllTime,
    CurrentPeriod,
    RecentExperience,
}

/// Summed totals over one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogbookStats {
    pub window: StatsWindow,
    /// Inclusive lower bound; `None` means unbounded.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound; `None` means unbounded.
    pub end: Option<NaiveDate>,
    /// Entries with non-zero flight time.
    pub flight_count: u32,
    /// Ground-training entries.
    pub ground_sessions: u32,
    pub totals: TimeTotals,
    pub landings_day: u64,
    pub landings_night: u64,
    pub asel_time: f64,
    pub tailwheel_time: f64,
    pub complex_time: f64,
    pub high_performance_time: f64,
    /// Mean total time per flight; 0 when there are no flights.
    pub average_flight_time: f64,
}

impl LogbookStats {
    pub fn empty(window: StatsWindow, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            window,
            start,
            end,
            flight_count: 0,
            ground_sessions: 0,
            totals: TimeTotals::default(),
            landings_day: 0,
            landings_night: 0,
            asel_time: 0.0,
            tailwheel_time: 0.0,
            complex_time: 0.0,
            high_performance_time: 0.0,
            average_flight_time: 0.0,
        }
    }

    /// Accumulate `entry` into the bucket. Call [`LogbookStats::finish`]
    /// once every entry has been added.
    pub fn add_entry(&mut self, entry: &FlightEntry) {
        self.totals.add_entry(entry);
        self.landings_day = self.landings_day.saturating_add(u64::from(entry.landings_day));
        self.landings_night = self
            .landings_night
            .saturating_add(u64::from(entry.landings_night));

        if entry.total_time > 0.0 {
            self.flight_count += 1;
        } else if entry.is_ground_training {
            self.ground_sessions += 1;
        }

        if entry.aircraft.is_asel() {
            self.asel_time += entry.total_time;
        }
        if entry.aircraft.is_tailwheel() {
            self.tailwheel_time += entry.total_time;
        }
        if entry.aircraft.complex {
            self.complex_time += entry.total_time;
        }
        if entry.aircraft.high_performance {
            self.high_performance_time += entry.total_time;
        }
    }

    /// Compute derived figures.
    pub fn finish(&mut self) {
        self.average_flight_time = if self.flight_count == 0 {
            0.0
        } else {
            self.totals.total_time / f64::from(self.flight_count)
        };
    }

    pub fn total_landings(&self) -> u64 {
        self.landings_day.saturating_add(self.landings_night)
    }

    /// Whether `date` falls inside this bucket's bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Per-registration summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftStat {
    pub registration: String,
    pub aircraft_type: String,
    pub flights: u32,
    pub total_time: f64,
}

// ── Import result ─────────────────────────────────────────────────────────────

/// A row the normalizer excluded under the skip-row policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

/// Pass-through and bookkeeping data for one import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportMetadata {
    pub original_filename: Option<String>,
    pub student_pilot: bool,
    /// Data rows handed to the rule engine.
    pub rows_read: usize,
    #[serde(default)]
    pub skipped_rows: Vec<SkippedRow>,
}

/// The complete output of one import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Entries in chronological order, each with running totals attached.
    pub entries: Vec<FlightEntry>,
    pub all_time: LogbookStats,
    pub current_period: LogbookStats,
    pub recent: LogbookStats,
    pub aircraft_stats: Vec<AircraftStat>,
    /// Entries carrying at least one error-kind issue.
    pub error_count: usize,
    /// Entries carrying at least one warning-kind issue.
    pub warning_count: usize,
    pub metadata: ImportMetadata,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
