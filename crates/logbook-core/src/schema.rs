//! Explicit column schema for logbook exports.
//!
//! Every recognised column maps to one canonical [`Field`]. A header row is
//! resolved once into a [`HeaderMap`], which then turns each data record into
//! a [`RawRow`] keyed by canonical field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Field ─────────────────────────────────────────────────────────────────────

/// Canonical column names understood by the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Date,
    Registration,
    AircraftType,
    CategoryClass,
    GearType,
    Complex,
    HighPerformance,
    From,
    To,
    TimeOut,
    TimeIn,
    Distance,
    TotalTime,
    Pic,
    Sic,
    DualReceived,
    DualGiven,
    Solo,
    GroundTraining,
    Day,
    Night,
    CrossCountry,
    SimulatedInstrument,
    ActualInstrument,
    DayLandings,
    NightLandings,
    PilotRole,
    Remarks,
    InstructorComments,
}

impl Field {
    pub const ALL: [Field; 29] = [
        Field::Date,
        Field::Registration,
        Field::AircraftType,
        Field::CategoryClass,
        Field::GearType,
        Field::Complex,
        Field::HighPerformance,
        Field::From,
        Field::To,
        Field::TimeOut,
        Field::TimeIn,
        Field::Distance,
        Field::TotalTime,
        Field::Pic,
        Field::Sic,
        Field::DualReceived,
        Field::DualGiven,
        Field::Solo,
        Field::GroundTraining,
        Field::Day,
        Field::Night,
        Field::CrossCountry,
        Field::SimulatedInstrument,
        Field::ActualInstrument,
        Field::DayLandings,
        Field::NightLandings,
        Field::PilotRole,
        Field::Remarks,
        Field::InstructorComments,
    ];

    /// Column name as written by a ForeFlight export.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Registration => "AircraftID",
            Field::AircraftType => "TypeCode",
            Field::CategoryClass => "aircraftClass (FAA)",
            Field::GearType => "GearType",
            Field::Complex => "complexAircraft (FAA)",
            Field::HighPerformance => "highPerformance (FAA)",
            Field::From => "From",
            Field::To => "To",
            Field::TimeOut => "TimeOut",
            Field::TimeIn => "TimeIn",
            Field::Distance => "Distance",
            Field::TotalTime => "TotalTime",
            Field::Pic => "PIC",
            Field::Sic => "SIC",
            Field::DualReceived => "DualReceived",
            Field::DualGiven => "DualGiven",
            Field::Solo => "Solo",
            Field::GroundTraining => "GroundTraining",
            Field::Day => "Day",
            Field::Night => "Night",
            Field::CrossCountry => "CrossCountry",
            Field::SimulatedInstrument => "SimulatedInstrument",
            Field::ActualInstrument => "ActualInstrument",
            Field::DayLandings => "DayLandingsFullStop",
            Field::NightLandings => "NightLandingsFullStop",
            Field::PilotRole => "PilotRole",
            Field::Remarks => "PilotComments",
            Field::InstructorComments => "InstructorComments",
        }
    }

    /// Accepted header spellings, already in [`normalize_header`] form.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Field::Date => &["date", "flightdate"],
            Field::Registration => &[
                "aircraftid",
                "registration",
                "tailnumber",
                "tail",
                "ident",
                "aircraft",
                "reg",
            ],
            Field::AircraftType => &[
                "typecode",
                "aircrafttype",
                "type",
                "icaotype",
                "typedesignator",
            ],
            Field::CategoryClass => &[
                "aircraftclassfaa",
                "aircraftclass",
                "categoryclass",
                "category",
                "class",
            ],
            Field::GearType => &["geartype", "gear"],
            Field::Complex => &["complexaircraftfaa", "complexaircraft", "complex"],
            Field::HighPerformance => &["highperformancefaa", "highperformance", "hp"],
            Field::From => &["from", "departure", "dep", "origin", "fromairport"],
            Field::To => &["to", "destination", "dest", "arrival", "arr", "toairport"],
            Field::TimeOut => &["timeout", "departuretime", "offblock", "blockout"],
            Field::TimeIn => &["timein", "arrivaltime", "onblock", "blockin"],
            Field::Distance => &["distance", "distancenm", "nm"],
            Field::TotalTime => &[
                "totaltime",
                "total",
                "totalduration",
                "duration",
                "flighttime",
                "totalflighttime",
            ],
            Field::Pic => &["pic", "pictime"],
            Field::Sic => &["sic", "sictime"],
            Field::DualReceived => &["dualreceived", "dual", "dualrcvd", "dualreceivedtime"],
            Field::DualGiven => &["dualgiven", "cfi", "instructing"],
            Field::Solo => &["solo", "solotime"],
            Field::GroundTraining => &[
                "groundtraining",
                "ground",
                "groundtime",
                "groundinstruction",
            ],
            Field::Day => &["day", "daytime"],
            Field::Night => &["night", "nighttime"],
            Field::CrossCountry => &["crosscountry", "xc", "xctime", "crosscountrytime"],
            Field::SimulatedInstrument => &[
                "simulatedinstrument",
                "simulatedinst",
                "siminst",
                "hood",
            ],
            Field::ActualInstrument => &["actualinstrument", "actualinst", "imc"],
            Field::DayLandings => &[
                "daylandingsfullstop",
                "daylandings",
                "landingsday",
                "daylanding",
            ],
            Field::NightLandings => &[
                "nightlandingsfullstop",
                "nightlandings",
                "landingsnight",
                "nightlanding",
            ],
            Field::PilotRole => &["pilotrole", "role"],
            Field::Remarks => &["pilotcomments", "remarks", "comments", "notes"],
            Field::InstructorComments => &["instructorcomments"],
        }
    }

    /// Match one header cell against every synonym table.
    pub fn from_header(cell: &str) -> Option<Field> {
        let key = normalize_header(cell);
        if key.is_empty() {
            return None;
        }
        Field::ALL
            .into_iter()
            .find(|f| f.synonyms().contains(&key.as_str()))
    }
}

/// Lower-case `cell` and drop everything that is not ASCII alphanumeric.
///
/// `"Total Time"`, `"TotalTime"` and `"total_time"` all become `"totaltime"`.
pub fn normalize_header(cell: &str) -> String {
    cell.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── HeaderMap ─────────────────────────────────────────────────────────────────

/// A header row resolved into positional column → field assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    columns: Vec<Option<Field>>,
}

impl HeaderMap {
    /// Resolve a header record. A field named by several columns is bound to
    /// the first of them.
    pub fn resolve<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut columns: Vec<Option<Field>> = Vec::new();
        for cell in cells {
            let field = Field::from_header(cell).filter(|f| !columns.contains(&Some(*f)));
            columns.push(field);
        }
        Self { columns }
    }

    /// Number of columns in the header row, recognised or not.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Width ignoring trailing unrecognised columns (ForeFlight pads rows
    /// with long runs of empty cells).
    pub fn significant_width(&self) -> usize {
        self.columns
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1)
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains(&Some(field))
    }

    pub fn recognized(&self) -> impl Iterator<Item = Field> + '_ {
        self.columns.iter().flatten().copied()
    }

    /// A flights-table header: a date column plus a registration or total.
    pub fn is_flight_header(&self) -> bool {
        self.has(Field::Date) && (self.has(Field::Registration) || self.has(Field::TotalTime))
    }

    /// An aircraft-table header: registration and type, but no date.
    pub fn is_aircraft_header(&self) -> bool {
        !self.has(Field::Date) && self.has(Field::Registration) && self.has(Field::AircraftType)
    }

    /// Build a [`RawRow`] from a data record, aligning cells by position.
    /// Cells beyond the header are ignored; missing cells stay absent.
    pub fn build_row<'a, I>(&self, line: usize, cells: I) -> RawRow
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut row = RawRow::new(line);
        for (field, value) in self.columns.iter().zip(cells) {
            if let Some(field) = field {
                row.set(*field, value);
            }
        }
        row
    }
}

// ── RawRow ────────────────────────────────────────────────────────────────────

/// One data line keyed by canonical field. Lives only for one pipeline pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source text.
    pub line: usize,
    values: BTreeMap<Field, String>,
    /// Structural irregularity noticed by the normalizer, if any.
    pub structural_note: Option<String>,
}

impl RawRow {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            values: BTreeMap::new(),
            structural_note: None,
        }
    }

    /// Store a trimmed value; overwrites any previous value.
    pub fn set(&mut self, field: Field, value: &str) {
        self.values.insert(field, value.trim().to_string());
    }

    /// Value for `field`, or `""` when absent.
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Whether `field` has a non-empty value.
    pub fn is_present(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    /// Non-empty value for `field`.
    pub fn value(&self, field: Field) -> Option<&str> {
        Some(self.get(field)).filter(|v| !v.is_empty())
    }

    /// Whether every stored value is empty.
    pub fn is_blank(&self) -> bool {
        self.values.values().all(String::is_empty)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
