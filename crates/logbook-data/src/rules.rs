//! Field validation: turns a [`RawRow`] into a typed [`FlightEntry`].
//!
//! Every rule appends at most one [`ValidationIssue`] to the entry. Nothing
//! here rejects a row; problems are recorded on the entry and the row moves
//! on to aggregation like any other.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use logbook_core::aircraft_types::{AircraftTypeValidator, AircraftTypeVocabulary, TypeCheck};
use logbook_core::config::ValidationConfig;
use logbook_core::models::{Aircraft, FlightEntry, IssueKind, Rule, ValidationIssue};
use logbook_core::schema::{Field, RawRow};
use regex::Regex;
use tracing::debug;

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Sub-categories that can never exceed the flight's total time.
const BOUNDED_BY_TOTAL: [Field; 5] = [
    Field::Pic,
    Field::DualReceived,
    Field::Solo,
    Field::CrossCountry,
    Field::Night,
];

/// Accepted clock layouts for block times.
const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H%M"];

/// Roles an export may name explicitly. `CFI` is read as `INSTRUCTOR`.
const KNOWN_ROLES: [&str; 5] = ["PIC", "SIC", "STUDENT", "INSTRUCTOR", "CFI"];

const EPSILON: f64 = 1e-9;

fn registration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]{1,3}-?[A-Z0-9]{1,5}$").expect("regex is valid"))
}

// ── RuleEngine ────────────────────────────────────────────────────────────────

/// Applies every field rule to one row at a time.
pub struct RuleEngine<'a> {
    validator: AircraftTypeValidator<'a>,
    config: &'a ValidationConfig,
    reference_date: NaiveDate,
}

impl<'a> RuleEngine<'a> {
    pub fn new(vocabulary: &'a AircraftTypeVocabulary, config: &'a ValidationConfig) -> Self {
        Self {
            validator: AircraftTypeValidator::new(vocabulary)
                .with_limits(config.max_type_suggestions, config.type_suggestion_threshold),
            config,
            reference_date: config.reference_date(),
        }
    }

    /// Convert `row` into a [`FlightEntry`].
    ///
    /// `error_count` is shared across the import and grows by one for each
    /// entry carrying at least one error, however many errors it has.
    pub fn validate_row(&self, row: &RawRow, error_count: &mut usize) -> FlightEntry {
        let mut issues: Vec<ValidationIssue> = Vec::new();
        let mut numbers = NumberScan::default();

        let date = self.check_date(row, &mut issues);

        let total_time = numbers.hours(row, Field::TotalTime);
        let total_parsed = numbers.is_clean();
        let pic = numbers.hours(row, Field::Pic);
        let sic = numbers.hours(row, Field::Sic);
        let dual_received = numbers.hours(row, Field::DualReceived);
        let dual_given = numbers.hours(row, Field::DualGiven);
        let solo = numbers.hours(row, Field::Solo);
        let ground_training = numbers.hours(row, Field::GroundTraining);
        let night = numbers.hours(row, Field::Night);
        let cross_country = numbers.hours(row, Field::CrossCountry);
        let simulated_instrument = numbers.hours(row, Field::SimulatedInstrument);
        let actual_instrument = numbers.hours(row, Field::ActualInstrument);
        let day_logged = row.is_present(Field::Day);
        let day = if day_logged {
            numbers.hours(row, Field::Day)
        } else {
            (total_time - night).max(0.0)
        };
        let max_landings = self.config.max_landings_per_entry;
        let landings_day = numbers.count(row, Field::DayLandings, max_landings);
        let landings_night = numbers.count(row, Field::NightLandings, max_landings);
        let departure_time = numbers.clock(row, Field::TimeOut);
        let arrival_time = numbers.clock(row, Field::TimeIn);
        let distance_nm = numbers.distance(row);

        let is_ground_training = ground_training > 0.0 && total_time == 0.0;
        let aircraft = self.check_aircraft(row, is_ground_training, &mut issues);
        numbers.report(&mut issues);

        let mut entry = FlightEntry {
            source_line: row.line,
            date,
            aircraft,
            departure: row.value(Field::From).map(String::from),
            destination: row.value(Field::To).map(String::from),
            departure_time,
            arrival_time,
            distance_nm,
            total_time,
            pic,
            dual_received,
            dual_given,
            sic,
            solo,
            ground_training,
            day,
            night,
            cross_country,
            simulated_instrument,
            actual_instrument,
            landings_day,
            landings_night,
            is_ground_training,
            remarks: row.value(Field::Remarks).map(String::from),
            instructor_comments: row.value(Field::InstructorComments).map(String::from),
            ..FlightEntry::default()
        };
        entry.pilot_role = pilot_role(row, &entry);

        check_airports(&entry, &mut issues);
        self.check_exceeds_total(&entry, &mut issues);
        if day_logged && row.is_present(Field::Night) {
            self.check_time_sum(&entry, &mut issues);
        }
        self.check_time_accounting(&entry, &mut issues);
        check_role(row, &entry, &mut issues);
        self.check_duration(&entry, total_parsed, &mut issues);
        if let Some(note) = &row.structural_note {
            issues.push(ValidationIssue::warning(
                Rule::ColumnCount,
                format!("Irregular row: {}", note),
            ));
        }

        entry.error_explanation = format_issues(&issues, IssueKind::Error);
        entry.warning_explanation = format_issues(&issues, IssueKind::Warning);
        entry.issues = issues;

        if entry.has_errors() {
            *error_count += 1;
        }
        if !entry.issues.is_empty() {
            debug!("Line {}: {} issue(s)", row.line, entry.issues.len());
        }
        entry
    }

    // ── Individual rules ──────────────────────────────────────────────────────

    fn check_date(&self, row: &RawRow, issues: &mut Vec<ValidationIssue>) -> Option<NaiveDate> {
        let Some(raw) = row.value(Field::Date) else {
            issues.push(ValidationIssue::error(Rule::MissingDate, "Missing flight date"));
            return None;
        };
        let Some(date) = parse_date(raw) else {
            issues.push(ValidationIssue::error(
                Rule::InvalidDate,
                format!("Unrecognized date '{}'", raw),
            ));
            return None;
        };
        if date > self.reference_date {
            issues.push(ValidationIssue::error(
                Rule::FutureDate,
                format!("Flight date {} is in the future", date),
            ));
        }
        Some(date)
    }

    /// Ground sessions are often logged against a placeholder such as
    /// `SIMULATOR`, so the format and vocabulary advisories skip them.
    fn check_aircraft(
        &self,
        row: &RawRow,
        ground_session: bool,
        issues: &mut Vec<ValidationIssue>,
    ) -> Aircraft {
        let registration = row.get(Field::Registration).to_uppercase();
        if registration.is_empty() {
            issues.push(ValidationIssue::error(
                Rule::MissingRegistration,
                "Missing aircraft registration",
            ));
        } else if !ground_session && !registration_pattern().is_match(&registration) {
            issues.push(ValidationIssue::warning(
                Rule::RegistrationFormat,
                format!("Unusual aircraft registration format: {}", registration),
            ));
        }

        let type_text = row.get(Field::AircraftType).to_string();
        let mut type_designator = None;
        if type_text.is_empty() {
            issues.push(ValidationIssue::error(
                Rule::MissingAircraftType,
                "Missing aircraft type",
            ));
        } else {
            let check = self.validator.validate(&type_text);
            match &check {
                TypeCheck::Valid { designator } => type_designator = Some(designator.clone()),
                TypeCheck::Missing => issues.push(ValidationIssue::error(
                    Rule::MissingAircraftType,
                    format!("Aircraft type '{}' contains no usable characters", type_text),
                )),
                TypeCheck::Unknown { .. } if ground_session => {}
                TypeCheck::Unknown { .. } => {
                    if let Some(message) = check.explanation() {
                        issues.push(ValidationIssue::warning(Rule::UnknownAircraftType, message));
                    }
                }
            }
        }

        Aircraft {
            registration,
            type_text,
            type_designator,
            category_class: row.get(Field::CategoryClass).to_string(),
            gear_type: row.value(Field::GearType).map(String::from),
            complex: parse_flag(row.get(Field::Complex)),
            high_performance: parse_flag(row.get(Field::HighPerformance)),
        }
    }

    fn check_exceeds_total(&self, entry: &FlightEntry, issues: &mut Vec<ValidationIssue>) {
        let mut exceeded: Vec<String> = BOUNDED_BY_TOTAL
            .iter()
            .filter_map(|&field| {
                let value = bounded_value(entry, field);
                (value > entry.total_time + EPSILON)
                    .then(|| format!("{} ({})", field.canonical_name(), value))
            })
            .collect();

        let instrument = entry.simulated_instrument + entry.actual_instrument;
        if instrument > entry.total_time + EPSILON {
            exceeded.push(format!("instrument ({})", instrument));
        }

        if !exceeded.is_empty() {
            issues.push(ValidationIssue::error(
                Rule::ExceedsTotal,
                format!(
                    "{} exceeds total time ({})",
                    exceeded.join(", "),
                    entry.total_time
                ),
            ));
        }
    }

    fn check_time_sum(&self, entry: &FlightEntry, issues: &mut Vec<ValidationIssue>) {
        let sum = entry.day + entry.night;
        if (sum - entry.total_time).abs() > self.config.time_sum_tolerance + EPSILON {
            issues.push(ValidationIssue::warning(
                Rule::TimeSumMismatch,
                format!(
                    "Day ({}) + night ({}) = {:.2} does not match total time ({})",
                    entry.day, entry.night, sum, entry.total_time
                ),
            ));
        }
    }

    /// PIC plus dual received should account for the whole flight. Rows that
    /// log neither are left alone, as are rows already over the total.
    fn check_time_accounting(&self, entry: &FlightEntry, issues: &mut Vec<ValidationIssue>) {
        let accounted = entry.pic + entry.dual_received;
        if entry.total_time <= 0.0
            || accounted <= 0.0
            || entry.pic > entry.total_time + EPSILON
            || entry.dual_received > entry.total_time + EPSILON
        {
            return;
        }
        if (accounted - entry.total_time).abs() > self.config.time_accounting_tolerance + EPSILON {
            issues.push(ValidationIssue::warning(
                Rule::TimeAccounting,
                format!(
                    "Total time ({:.1}) should equal PIC ({:.1}) plus dual received ({:.1})",
                    entry.total_time, entry.pic, entry.dual_received
                ),
            ));
        }
    }

    fn check_duration(
        &self,
        entry: &FlightEntry,
        total_parsed: bool,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if entry.total_time > 0.0 && entry.total_time < self.config.min_plausible_flight_time {
            issues.push(ValidationIssue::warning(
                Rule::ImplausibleDuration,
                format!(
                    "Flight time of {} hours seems implausibly short",
                    entry.total_time
                ),
            ));
        } else if entry.total_time == 0.0 && entry.ground_training == 0.0 && total_parsed {
            issues.push(ValidationIssue::warning(
                Rule::ZeroFlightTime,
                "No flight time or ground training logged",
            ));
        }
    }
}

/// Join every issue of `kind` with `"; "`, or `None` if there are none.
pub fn format_issues(issues: &[ValidationIssue], kind: IssueKind) -> Option<String> {
    let messages: Vec<&str> = issues
        .iter()
        .filter(|i| i.kind == kind)
        .map(|i| i.message.as_str())
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

fn check_airports(entry: &FlightEntry, issues: &mut Vec<ValidationIssue>) {
    if entry.is_ground_training || entry.total_time <= 0.0 {
        return;
    }
    let message = match (entry.departure.is_some(), entry.destination.is_some()) {
        (true, true) => return,
        (false, true) => "Missing departure airport",
        (true, false) => "Missing destination airport",
        (false, false) => "Missing departure and destination airports",
    };
    issues.push(ValidationIssue::warning(Rule::MissingAirport, message));
}

// ── Role inference ────────────────────────────────────────────────────────────

fn pilot_role(row: &RawRow, entry: &FlightEntry) -> String {
    if let Some(role) = row.value(Field::PilotRole) {
        return role.to_uppercase();
    }
    let role = if entry.pic > 0.0 && entry.dual_received > 0.0 {
        "SPLIT"
    } else if entry.dual_received > 0.0 {
        "STUDENT"
    } else if entry.dual_given > 0.0 {
        "INSTRUCTOR"
    } else if entry.pic > 0.0 {
        "PIC"
    } else if entry.sic > 0.0 {
        "SIC"
    } else if entry.is_ground_training {
        "GROUND"
    } else {
        "PIC"
    };
    role.to_string()
}

fn is_instructional(row: &RawRow, entry: &FlightEntry) -> bool {
    let explicit = row.value(Field::PilotRole).map(str::to_uppercase);
    entry.dual_given > 0.0 || matches!(explicit.as_deref(), Some("INSTRUCTOR" | "CFI"))
}

fn check_role(row: &RawRow, entry: &FlightEntry, issues: &mut Vec<ValidationIssue>) {
    if let Some(role) = row.value(Field::PilotRole) {
        if !KNOWN_ROLES.contains(&role.to_uppercase().as_str()) {
            issues.push(ValidationIssue::warning(
                Rule::UnrecognizedRole,
                format!(
                    "Unrecognized pilot role '{}' (expected PIC, SIC, STUDENT or INSTRUCTOR)",
                    role
                ),
            ));
        }
    }
    if entry.dual_received > 0.0 && entry.pic > 0.0 && !is_instructional(row, entry) {
        issues.push(ValidationIssue::warning(
            Rule::AmbiguousRole,
            format!(
                "Both dual received ({}) and PIC ({}) logged on a non-instructional flight",
                entry.dual_received, entry.pic
            ),
        ));
    }
}

// ── Cell parsing ──────────────────────────────────────────────────────────────

/// Collects malformed and negative cells so each rule reports once per entry.
#[derive(Default)]
struct NumberScan {
    invalid: Vec<String>,
    negative: Vec<String>,
}

impl NumberScan {
    /// Hours in `field`; absent, malformed and negative cells count as 0.
    fn hours(&mut self, row: &RawRow, field: Field) -> f64 {
        let Some(raw) = row.value(field) else {
            return 0.0;
        };
        match parse_hours(raw) {
            Some(value) if value < 0.0 => {
                self.negative
                    .push(format!("{} = {}", field.canonical_name(), raw));
                0.0
            }
            Some(value) => value,
            None => {
                self.invalid
                    .push(format!("{} = '{}'", field.canonical_name(), raw));
                0.0
            }
        }
    }

    /// Landing count in `field`; absent, malformed, negative and
    /// above-`max` cells count as 0.
    fn count(&mut self, row: &RawRow, field: Field, max: u32) -> u32 {
        let Some(raw) = row.value(field) else {
            return 0;
        };
        match parse_count(raw) {
            Some(value) if value < 0 => {
                self.negative
                    .push(format!("{} = {}", field.canonical_name(), raw));
                0
            }
            Some(value) => match u32::try_from(value) {
                Ok(count) if count <= max => count,
                _ => {
                    self.invalid.push(format!(
                        "{} = '{}' (more than {})",
                        field.canonical_name(),
                        raw,
                        max
                    ));
                    0
                }
            },
            None => {
                self.invalid
                    .push(format!("{} = '{}'", field.canonical_name(), raw));
                0
            }
        }
    }

    /// Clock time in `field`; absent and malformed cells are `None`.
    fn clock(&mut self, row: &RawRow, field: Field) -> Option<NaiveTime> {
        let raw = row.value(field)?;
        let time = parse_clock(raw);
        if time.is_none() {
            self.invalid
                .push(format!("{} = '{}'", field.canonical_name(), raw));
        }
        time
    }

    /// Distance in nautical miles; negative cells count as 0.
    fn distance(&mut self, row: &RawRow) -> Option<f64> {
        let raw = row.value(Field::Distance)?;
        match raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
            Some(value) if value < 0.0 => {
                self.negative
                    .push(format!("{} = {}", Field::Distance.canonical_name(), raw));
                Some(0.0)
            }
            Some(value) => Some(value),
            None => {
                self.invalid
                    .push(format!("{} = '{}'", Field::Distance.canonical_name(), raw));
                None
            }
        }
    }

    fn is_clean(&self) -> bool {
        self.invalid.is_empty() && self.negative.is_empty()
    }

    fn report(self, issues: &mut Vec<ValidationIssue>) {
        if !self.invalid.is_empty() {
            issues.push(ValidationIssue::error(
                Rule::InvalidNumber,
                format!("Invalid number: {}", self.invalid.join(", ")),
            ));
        }
        if !self.negative.is_empty() {
            issues.push(ValidationIssue::error(
                Rule::NegativeValue,
                format!(
                    "Negative value counted as 0: {}",
                    self.negative.join(", ")
                ),
            ));
        }
    }
}

/// Parse a date in any of [`DATE_FORMATS`]. A trailing time part is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Parse decimal hours (`1.5`) or `H:MM` (`1:30`).
pub fn parse_hours(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some((hours, minutes)) = raw.split_once(':') {
        let negative = hours.trim_start().starts_with('-');
        let hours: i64 = hours.trim().parse().ok()?;
        let minutes: u32 = minutes.trim().parse().ok()?;
        if minutes >= 60 {
            return None;
        }
        let magnitude = hours.unsigned_abs() as f64 + f64::from(minutes) / 60.0;
        return Some(if negative { -magnitude } else { magnitude });
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a block time in any of [`TIME_FORMATS`].
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

fn parse_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x"
    )
}

fn bounded_value(entry: &FlightEntry, field: Field) -> f64 {
    match field {
        Field::Pic => entry.pic,
        Field::DualReceived => entry.dual_received,
        Field::Solo => entry.solo,
        Field::CrossCountry => entry.cross_country,
        Field::Night => entry.night,
        _ => 0.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
