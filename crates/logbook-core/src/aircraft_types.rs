//! Aircraft type designator vocabulary and fuzzy validation.
//!
//! The vocabulary is an immutable table built once and shared by reference.
//! Validation normalises the input, looks for an exact match and otherwise
//! ranks near-misses by normalised Levenshtein similarity.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of suggestions returned for an unknown code.
pub const MAX_SUGGESTIONS: usize = 3;
/// Similarity (0.0–1.0) a vocabulary code must exceed to be suggested.
pub const SUGGESTION_THRESHOLD: f64 = 0.5;

/// Common logbook types: `(code, manufacturer, model, category)`.
///
/// Not a complete copy of ICAO Doc 8643.
const BUILTIN_TYPES: &[(&str, &str, &str, &str)] = &[
    // Cessna
    ("C150", "Cessna", "150", "Light Single-Engine"),
    ("C152", "Cessna", "152", "Light Single-Engine"),
    ("C162", "Cessna", "162 Skycatcher", "Light Single-Engine"),
    ("C172", "Cessna", "172 Skyhawk", "Light Single-Engine"),
    ("C175", "Cessna", "175", "Light Single-Engine"),
    ("C177", "Cessna", "177 Cardinal", "Light Single-Engine"),
    ("C180", "Cessna", "180", "Light Single-Engine"),
    ("C182", "Cessna", "182 Skylane", "Light Single-Engine"),
    ("C185", "Cessna", "185", "Light Single-Engine"),
    ("C206", "Cessna", "206", "Light Single-Engine"),
    ("C207", "Cessna", "207", "Light Single-Engine"),
    ("C208", "Cessna", "208 Caravan", "Light Turboprop"),
    ("C210", "Cessna", "210 Centurion", "Light Single-Engine"),
    ("C310", "Cessna", "310", "Light Twin-Engine"),
    ("C337", "Cessna", "337 Skymaster", "Light Twin-Engine"),
    ("C340", "Cessna", "340", "Light Twin-Engine"),
    ("C402", "Cessna", "402", "Light Twin-Engine"),
    ("C414", "Cessna", "414", "Light Twin-Engine"),
    ("C421", "Cessna", "421", "Light Twin-Engine"),
    ("C441", "Cessna", "441 Conquest", "Light Turboprop"),
    ("C500", "Cessna", "Citation I", "Light Jet"),
    ("C525", "Cessna", "CitationJet", "Light Jet"),
    ("C550", "Cessna", "Citation II", "Light Jet"),
    ("C560", "Cessna", "Citation V", "Light Jet"),
    ("C650", "Cessna", "Citation III", "Mid-Size Jet"),
    ("C680", "Cessna", "Citation Sovereign", "Mid-Size Jet"),
    ("C750", "Cessna", "Citation X", "Large Jet"),

    // Piper
    ("PA18", "Piper", "J-3 Cub", "Light Single-Engine"),
    ("PA20", "Piper", "Pacer", "Light Single-Engine"),
    ("PA22", "Piper", "Tri-Pacer", "Light Single-Engine"),
    ("PA24", "Piper", "Comanche", "Light Single-Engine"),
    ("PA25", "Piper", "Pawnee", "Agricultural"),
    ("PA28", "Piper", "Cherokee/Warrior/Archer", "Light Single-Engine"),
    ("PA30", "Piper", "Twin Comanche", "Light Twin-Engine"),
    ("PA31", "Piper", "Navajo", "Light Twin-Engine"),
    ("PA32", "Piper", "Cherokee Six/Saratoga", "Light Single-Engine"),
    ("PA34", "Piper", "Seneca", "Light Twin-Engine"),
    ("PA36", "Piper", "Pawnee Brave", "Agricultural"),
    ("PA38", "Piper", "Tomahawk", "Light Single-Engine"),
    ("PA44", "Piper", "Seminole", "Light Twin-Engine"),
    ("PA46", "Piper", "Malibu/Mirage/Matrix", "Light Single-Engine"),

    // Beechcraft
    ("B190", "Beechcraft", "King Air 100", "Light Turboprop"),
    ("B200", "Beechcraft", "King Air 200", "Light Turboprop"),
    ("B300", "Beechcraft", "King Air 350", "Light Turboprop"),
    ("BE20", "Beechcraft", "King Air", "Light Turboprop"),
    ("BE23", "Beechcraft", "Musketeer/Sundowner", "Light Single-Engine"),
    ("BE24", "Beechcraft", "Sierra", "Light Single-Engine"),
    ("BE33", "Beechcraft", "Debonair/Bonanza", "Light Single-Engine"),
    ("BE35", "Beechcraft", "Bonanza", "Light Single-Engine"),
    ("BE36", "Beechcraft", "Bonanza A36", "Light Single-Engine"),
    ("BE40", "Beechcraft", "Beechjet 400", "Light Jet"),
    ("BE55", "Beechcraft", "Baron", "Light Twin-Engine"),
    ("BE58", "Beechcraft", "Baron", "Light Twin-Engine"),
    ("BE76", "Beechcraft", "Duchess", "Light Twin-Engine"),
    ("BE77", "Beechcraft", "Skipper", "Light Single-Engine"),
    ("BE9L", "Beechcraft", "King Air 90", "Light Turboprop"),
    ("BE9T", "Beechcraft", "King Air 90", "Light Turboprop"),

    // Cirrus
    ("SR20", "Cirrus", "SR20", "Light Single-Engine"),
    ("SR22", "Cirrus", "SR22", "Light Single-Engine"),
    ("SF50", "Cirrus", "Vision Jet", "Light Jet"),

    // Diamond
    ("DA20", "Diamond", "Katana", "Light Single-Engine"),
    ("DA40", "Diamond", "Diamond Star", "Light Single-Engine"),
    ("DA42", "Diamond", "Twin Star", "Light Twin-Engine"),
    ("DA62", "Diamond", "DA62", "Light Twin-Engine"),

    // American Champion
    ("CH7A", "American Champion", "7ECA Citabria", "Aerobatic"),
    ("CH7B", "American Champion", "7GCAA Citabria", "Aerobatic"),
    ("CH7C", "American Champion", "7GCBC Citabria", "Aerobatic"),
    ("CH7E", "American Champion", "7ECA Citabria", "Aerobatic"),
    ("CH7G", "American Champion", "7GCAA Citabria", "Aerobatic"),
    ("CH7K", "American Champion", "7KCAB Citabria", "Aerobatic"),
    ("CH8A", "American Champion", "8KCAB Decathlon", "Aerobatic"),
    ("CH8G", "American Champion", "8GCBC Scout", "Light Single-Engine"),
    ("BL8", "American Champion", "8KCAB Decathlon", "Aerobatic"),

    // Mooney
    ("M20C", "Mooney", "M20C Ranger", "Light Single-Engine"),
    ("M20E", "Mooney", "M20E Super 21", "Light Single-Engine"),
    ("M20F", "Mooney", "M20F Executive 21", "Light Single-Engine"),
    ("M20J", "Mooney", "M20J 201", "Light Single-Engine"),
    ("M20K", "Mooney", "M20K 231", "Light Single-Engine"),
    ("M20M", "Mooney", "M20M TLS", "Light Single-Engine"),
    ("M20R", "Mooney", "M20R Ovation", "Light Single-Engine"),
    ("M20S", "Mooney", "M20S Eagle", "Light Single-Engine"),
    ("M20T", "Mooney", "M20T Acclaim", "Light Single-Engine"),

    // Grumman/American General
    ("AA1", "Grumman", "AA-1 Yankee", "Light Single-Engine"),
    ("AA1A", "Grumman", "AA-1A Trainer", "Light Single-Engine"),
    ("AA1B", "Grumman", "AA-1B Trainer", "Light Single-Engine"),
    ("AA1C", "Grumman", "AA-1C Lynx", "Light Single-Engine"),
    ("AA5A", "Grumman", "AA-5A Cheetah", "Light Single-Engine"),
    ("AA5B", "Grumman", "AA-5B Tiger", "Light Single-Engine"),
    ("AG5B", "American General", "AG-5B Tiger", "Light Single-Engine"),

    // Vans
    ("RV3", "Van's", "RV-3", "Experimental"),
    ("RV4", "Van's", "RV-4", "Experimental"),
    ("RV6", "Van's", "RV-6", "Experimental"),
    ("RV7", "Van's", "RV-7", "Experimental"),
    ("RV8", "Van's", "RV-8", "Experimental"),
    ("RV9", "Van's", "RV-9", "Experimental"),
    ("RV10", "Van's", "RV-10", "Experimental"),
    ("RV12", "Van's", "RV-12", "Light Sport"),
    ("RV14", "Van's", "RV-14", "Experimental"),

    // Maule
    ("M4", "Maule", "M-4", "Light Single-Engine"),
    ("M5", "Maule", "M-5", "Light Single-Engine"),
    ("M6", "Maule", "M-6", "Light Single-Engine"),
    ("M7", "Maule", "M-7", "Light Single-Engine"),
    ("M8", "Maule", "M-8", "Light Single-Engine"),
    ("M9", "Maule", "M-9", "Light Single-Engine"),

    // Socata/Daher
    ("TBM7", "Socata", "TBM 700", "Light Turboprop"),
    ("TBM8", "Socata", "TBM 800", "Light Turboprop"),
    ("TBM9", "Daher", "TBM 900", "Light Turboprop"),
    ("TB10", "Socata", "TB 10 Tobago", "Light Single-Engine"),
    ("TB20", "Socata", "TB 20 Trinidad", "Light Single-Engine"),
    ("TB21", "Socata", "TB 21 Trinidad TC", "Light Single-Engine"),

    // Extra
    ("EA30", "Extra", "EA-300", "Aerobatic"),
    ("EA32", "Extra", "EA-330", "Aerobatic"),

    // Pitts Special
    ("PTS1", "Pitts", "S-1 Special", "Aerobatic"),
    ("PTS2", "Pitts", "S-2 Special", "Aerobatic"),

    // Gliders
    ("ASK13", "Alexander Schleicher", "ASK 13", "Glider"),
    ("ASK21", "Alexander Schleicher", "ASK 21", "Glider"),
    ("K21", "Alexander Schleicher", "ASK 21", "Glider"),
    ("SGS233", "Schweizer", "SGS 2-33", "Glider"),
    ("SGS126", "Schweizer", "SGS 1-26", "Glider"),

    // Light Sport
    ("CTLS", "Flight Design", "CT-LS", "Light Sport"),
    ("FK9", "FK Lightplanes", "FK9", "Light Sport"),
    ("RANS", "RANS", "S-6ES Coyote II", "Light Sport"),

    // Vintage/Warbird
    ("BT13", "Vultee", "BT-13 Valiant", "Vintage Trainer"),
    ("T6", "North American/Beechcraft", "T-6 Texan/Harvard", "Military Trainer"),
    ("AT6", "North American", "AT-6 Texan", "Military Trainer"),

    // Helicopters
    ("R22", "Robinson", "R22", "Helicopter"),
    ("R44", "Robinson", "R44", "Helicopter"),
    ("R66", "Robinson", "R66", "Helicopter"),
    ("H269", "Hughes/Schweizer", "269/300", "Helicopter"),
    ("S300", "Schweizer", "S-300", "Helicopter"),

    // Commercial
    ("B737", "Boeing", "737", "Commercial Jet"),
    ("B738", "Boeing", "737-800", "Commercial Jet"),
    ("B739", "Boeing", "737-900", "Commercial Jet"),
    ("B752", "Boeing", "757-200", "Commercial Jet"),
    ("B763", "Boeing", "767-300", "Commercial Jet"),
    ("B772", "Boeing", "777-200", "Commercial Jet"),
    ("B773", "Boeing", "777-300", "Commercial Jet"),
    ("B787", "Boeing", "787 Dreamliner", "Commercial Jet"),
    ("A319", "Airbus", "A319", "Commercial Jet"),
    ("A320", "Airbus", "A320", "Commercial Jet"),
    ("A321", "Airbus", "A321", "Commercial Jet"),
    ("A330", "Airbus", "A330", "Commercial Jet"),
    ("A350", "Airbus", "A350", "Commercial Jet"),
    ("E145", "Embraer", "ERJ 145", "Regional Jet"),
    ("E170", "Embraer", "E-Jet 170", "Regional Jet"),
    ("E175", "Embraer", "E-Jet 175", "Regional Jet"),
    ("CRJ2", "Bombardier", "CRJ-200", "Regional Jet"),
    ("CRJ7", "Bombardier", "CRJ-700", "Regional Jet"),
    ("CRJ9", "Bombardier", "CRJ-900", "Regional Jet"),
    ("DH8A", "De Havilland", "Dash 8-100", "Regional Turboprop"),
    ("DH8B", "De Havilland", "Dash 8-200", "Regional Turboprop"),
    ("DH8C", "De Havilland", "Dash 8-300", "Regional Turboprop"),
    ("DH8D", "De Havilland", "Dash 8-400", "Regional Turboprop"),
    ("AT72", "ATR", "ATR 72", "Regional Turboprop"),
    ("AT42", "ATR", "ATR 42", "Regional Turboprop"),

    // Military and uncommon types
    ("T34", "Beechcraft", "T-34 Mentor", "Military Trainer"),
    ("T28", "North American", "T-28 Trojan", "Military Trainer"),
    ("P51", "North American", "P-51 Mustang", "Warbird"),
    ("F16", "General Dynamics", "F-16 Fighting Falcon", "Military Jet"),
    ("F18", "McDonnell Douglas", "F/A-18 Hornet", "Military Jet"),
    ("A10", "Fairchild Republic", "A-10 Thunderbolt II", "Military Jet"),
    ("C130", "Lockheed", "C-130 Hercules", "Military Transport"),
    ("KC135", "Boeing", "KC-135 Stratotanker", "Military Transport"),
    ("DHC2", "De Havilland Canada", "DHC-2 Beaver", "Light Single-Engine"),
    ("DHC3", "De Havilland Canada", "DHC-3 Otter", "Light Single-Engine"),
    ("DHC6", "De Havilland Canada", "DHC-6 Twin Otter", "Light Turboprop"),
    ("AN2", "Antonov", "An-2", "Utility"),
    ("L39", "Aero", "L-39 Albatros", "Military Trainer"),
];

// ── TypeDesignator ────────────────────────────────────────────────────────────

/// One vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDesignator {
    pub code: String,
    pub manufacturer: String,
    pub model: String,
    pub category: String,
}

impl TypeDesignator {
    pub fn new(code: &str, manufacturer: &str, model: &str, category: &str) -> Self {
        Self {
            code: code.to_string(),
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            category: category.to_string(),
        }
    }
}

// ── AircraftTypeVocabulary ────────────────────────────────────────────────────

/// Read-only set of valid type designators, in insertion order.
#[derive(Debug, Clone)]
pub struct AircraftTypeVocabulary {
    entries: Vec<TypeDesignator>,
    index: HashMap<String, usize>,
}

/// Counts describing a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySummary {
    pub total_codes: usize,
    pub categories: BTreeMap<String, usize>,
    pub manufacturers: usize,
}

impl AircraftTypeVocabulary {
    /// Build a vocabulary. Codes are normalised; empty codes and later
    /// duplicates are dropped so the first occurrence keeps its position.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TypeDesignator>,
    {
        let mut kept: Vec<TypeDesignator> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for mut entry in entries {
            let Some(code) = normalize_type_code(&entry.code) else {
                continue;
            };
            if index.contains_key(&code) {
                continue;
            }
            entry.code = code.clone();
            index.insert(code, kept.len());
            kept.push(entry);
        }

        Self {
            entries: kept,
            index,
        }
    }

    /// The built-in table, constructed on first use and shared for the
    /// lifetime of the process.
    pub fn builtin() -> &'static AircraftTypeVocabulary {
        static BUILTIN: OnceLock<AircraftTypeVocabulary> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let vocabulary =
                Self::from_entries(BUILTIN_TYPES.iter().map(|(code, manufacturer, model, category)| {
                    TypeDesignator::new(code, manufacturer, model, category)
                }));
            debug!("Built aircraft type vocabulary with {} codes", vocabulary.len());
            vocabulary
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case- and punctuation-insensitive membership test.
    pub fn contains(&self, code: &str) -> bool {
        self.info(code).is_some()
    }

    /// Details for `code`, if it is in the vocabulary.
    pub fn info(&self, code: &str) -> Option<&TypeDesignator> {
        let normalized = normalize_type_code(code)?;
        self.index.get(&normalized).map(|&i| &self.entries[i])
    }

    /// Codes built by `manufacturer` (case-insensitive), sorted.
    pub fn codes_by_manufacturer(&self, manufacturer: &str) -> Vec<&str> {
        let wanted = manufacturer.to_lowercase();
        let mut codes: Vec<&str> = self
            .entries
            .iter()
            .filter(|e| e.manufacturer.to_lowercase() == wanted)
            .map(|e| e.code.as_str())
            .collect();
        codes.sort_unstable();
        codes
    }

    pub fn summary(&self) -> VocabularySummary {
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut manufacturers: Vec<&str> = Vec::new();
        for entry in &self.entries {
            *categories.entry(entry.category.clone()).or_default() += 1;
            if !manufacturers.contains(&entry.manufacturer.as_str()) {
                manufacturers.push(&entry.manufacturer);
            }
        }
        VocabularySummary {
            total_codes: self.entries.len(),
            categories,
            manufacturers: manufacturers.len(),
        }
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }
}

// ── Normalisation ─────────────────────────────────────────────────────────────

/// Trim, upper-case and keep only `A-Z` / `0-9`.
///
/// Returns `None` when nothing is left. Idempotent.
pub fn normalize_type_code(code: &str) -> Option<String> {
    let normalized: String = code
        .trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// A ranked near-miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub code: String,
    pub similarity: f64,
}

/// Outcome of [`AircraftTypeValidator::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TypeCheck {
    /// Exact match; `designator` is the normalised vocabulary code.
    Valid { designator: String },
    /// No exact match. `suggestions` may be empty.
    Unknown {
        normalized: String,
        suggestions: Vec<Suggestion>,
    },
    /// Nothing left after normalisation.
    Missing,
}

impl TypeCheck {
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            TypeCheck::Unknown { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    pub fn suggested_codes(&self) -> Vec<&str> {
        self.suggestions().iter().map(|s| s.code.as_str()).collect()
    }

    /// Human-readable explanation of a failed check; `None` for a valid code.
    pub fn explanation(&self) -> Option<String> {
        match self {
            TypeCheck::Valid { .. } => None,
            TypeCheck::Missing => Some("Missing aircraft type code".to_string()),
            TypeCheck::Unknown { normalized, .. } => {
                let mut message = format!("Unrecognized aircraft type '{}'", normalized);
                let codes = self.suggested_codes();
                if !codes.is_empty() {
                    message.push_str(&format!(" (did you mean {}?)", codes.join(", ")));
                }
                Some(message)
            }
        }
    }
}

/// Validates free-text type codes against an injected vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct AircraftTypeValidator<'a> {
    vocabulary: &'a AircraftTypeVocabulary,
    max_suggestions: usize,
    threshold: f64,
}

impl<'a> AircraftTypeValidator<'a> {
    pub fn new(vocabulary: &'a AircraftTypeVocabulary) -> Self {
        Self {
            vocabulary,
            max_suggestions: MAX_SUGGESTIONS,
            threshold: SUGGESTION_THRESHOLD,
        }
    }

    pub fn with_limits(mut self, max_suggestions: usize, threshold: f64) -> Self {
        self.max_suggestions = max_suggestions;
        self.threshold = threshold;
        self
    }

    /// Normalise `code` and look it up.
    pub fn validate(&self, code: &str) -> TypeCheck {
        let Some(normalized) = normalize_type_code(code) else {
            return TypeCheck::Missing;
        };
        if self.vocabulary.position(&normalized).is_some() {
            return TypeCheck::Valid {
                designator: normalized,
            };
        }
        let suggestions = self.suggest(&normalized);
        TypeCheck::Unknown {
            normalized,
            suggestions,
        }
    }

    /// Rank vocabulary codes by similarity to an already normalised code.
    ///
    /// Ordering: similarity descending, then vocabulary position, then code.
    pub fn suggest(&self, normalized: &str) -> Vec<Suggestion> {
        let mut scored: Vec<(f64, usize, &str)> = self
            .vocabulary
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (similarity(normalized, &e.code), i, e.code.as_str()))
            .filter(|(score, _, _)| *score > self.threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(b.2))
        });

        scored
            .into_iter()
            .take(self.max_suggestions)
            .map(|(similarity, _, code)| Suggestion {
                code: code.to_string(),
                similarity,
            })
            .collect()
    }
}

/// `1 - distance / max_len`, in `0.0..=1.0`. Two empty strings score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Minimum single-character insertions, deletions and substitutions
/// turning `a` into `b`.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn small_vocabulary() -> AircraftTypeVocabulary {
        AircraftTypeVocabulary::from_entries(vec![
            TypeDesignator::new("C152", "Cessna", "152", "Light Single-Engine"),
            TypeDesignator::new("C172", "Cessna", "172 Skyhawk", "Light Single-Engine"),
            TypeDesignator::new("PA28", "Piper", "Cherokee", "Light Single-Engine"),
            TypeDesignator::new("c-172", "Cessna", "duplicate", "Light Single-Engine"),
        ])
    }

    // ── normalize_type_code ───────────────────────────────────────────────────

    #[test]
    fn test_normalize_strips_and_uppercases() {
        assert_eq!(normalize_type_code("c-172"), Some("C172".to_string()));
        assert_eq!(normalize_type_code("  pa 28 "), Some("PA28".to_string()));
        assert_eq!(normalize_type_code("Sr22/T"), Some("SR22T".to_string()));
    }

    #[test]
    fn test_normalize_empty_is_none() {
        assert_eq!(normalize_type_code(""), None);
        assert_eq!(normalize_type_code("   "), None);
        assert_eq!(normalize_type_code("--/"), None);
    }

    #[test]
    fn test_normalize_idempotent() {
        for input in ["c-172", " Pa-28-181 ", "BE9L", "ü-äx 7", "T-6", "x"] {
            let once = normalize_type_code(input);
            let twice = once.as_deref().and_then(normalize_type_code);
            assert_eq!(once, twice, "input {:?}", input);
        }
    }

    // ── vocabulary ────────────────────────────────────────────────────────────

    #[test]
    fn test_from_entries_dedupes_after_normalizing() {
        let vocab = small_vocabulary();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.info("c172").unwrap().model, "172 Skyhawk");
    }

    #[test]
    fn test_builtin_contains_common_types() {
        let vocab = AircraftTypeVocabulary::builtin();
        for code in ["C172", "PA28", "SR22", "BE36", "R44", "B738", "DHC2", "T6", "BT13"] {
            assert!(vocab.contains(code), "missing {}", code);
        }
        assert!(!vocab.contains("ZZZZ"));
        assert!(vocab.len() > 150);
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = AircraftTypeVocabulary::builtin() as *const _;
        let b = AircraftTypeVocabulary::builtin() as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn test_codes_by_manufacturer_sorted() {
        let vocab = AircraftTypeVocabulary::builtin();
        let cirrus = vocab.codes_by_manufacturer("cirrus");
        assert_eq!(cirrus, vec!["SF50", "SR20", "SR22"]);
        assert!(vocab.codes_by_manufacturer("Nobody").is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let summary = small_vocabulary().summary();
        assert_eq!(summary.total_codes, 3);
        assert_eq!(summary.manufacturers, 2);
        assert_eq!(summary.categories.get("Light Single-Engine"), Some(&3));
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn test_validate_exact_match_after_normalizing() {
        let vocab = AircraftTypeVocabulary::builtin();
        let validator = AircraftTypeValidator::new(vocab);
        let check = validator.validate("c-172");
        assert_eq!(
            check,
            TypeCheck::Valid {
                designator: "C172".to_string()
            }
        );
        assert!(check.suggestions().is_empty());
    }

    #[test]
    fn test_validate_near_miss_suggests_closest_first() {
        let vocab = AircraftTypeVocabulary::builtin();
        let validator = AircraftTypeValidator::new(vocab);
        let check = validator.validate("C1722");
        assert!(!matches!(check, TypeCheck::Valid { .. }));
        let codes = check.suggested_codes();
        assert!(!codes.is_empty() && codes.len() <= MAX_SUGGESTIONS);
        assert_eq!(codes[0], "C172");
    }

    #[test]
    fn test_validate_ties_follow_vocabulary_order() {
        let vocab = small_vocabulary();
        let validator = AircraftTypeValidator::new(&vocab);
        // C1X2 is one substitution away from both C152 and C172.
        let check = validator.validate("C1X2");
        assert_eq!(check.suggested_codes(), vec!["C152", "C172"]);
    }

    #[test]
    fn test_validate_no_suggestion_below_threshold() {
        let vocab = small_vocabulary();
        let validator = AircraftTypeValidator::new(&vocab);
        let check = validator.validate("ZZZZZZZZ");
        assert_eq!(
            check,
            TypeCheck::Unknown {
                normalized: "ZZZZZZZZ".to_string(),
                suggestions: vec![],
            }
        );
    }

    #[test]
    fn test_validate_missing() {
        let validator = AircraftTypeValidator::new(AircraftTypeVocabulary::builtin());
        assert_eq!(validator.validate("  "), TypeCheck::Missing);
    }

    #[test]
    fn test_validate_deterministic() {
        let validator = AircraftTypeValidator::new(AircraftTypeVocabulary::builtin());
        let first = validator.validate("PA2B");
        for _ in 0..5 {
            assert_eq!(validator.validate("PA2B"), first);
        }
    }

    #[test]
    fn test_with_limits_caps_suggestions() {
        let vocab = small_vocabulary();
        let validator = AircraftTypeValidator::new(&vocab).with_limits(1, 0.5);
        assert_eq!(validator.validate("C1X2").suggested_codes(), vec!["C152"]);
    }

    #[test]
    fn test_explanation_lists_suggestions() {
        let vocab = small_vocabulary();
        let validator = AircraftTypeValidator::new(&vocab);
        assert_eq!(
            validator.validate("C1X2").explanation().as_deref(),
            Some("Unrecognized aircraft type 'C1X2' (did you mean C152, C172?)")
        );
        assert_eq!(
            validator.validate("ZZZZZZZZ").explanation().as_deref(),
            Some("Unrecognized aircraft type 'ZZZZZZZZ'")
        );
        assert_eq!(validator.validate("c172").explanation(), None);
        assert_eq!(
            validator.validate("--").explanation().as_deref(),
            Some("Missing aircraft type code")
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let vocab = AircraftTypeVocabulary::from_entries(vec![TypeDesignator::new(
            "AB", "Test", "Test", "Test",
        )]);
        // "AX" scores exactly 0.5 against "AB".
        let validator = AircraftTypeValidator::new(&vocab);
        assert!((similarity("AX", "AB") - 0.5).abs() < 1e-9);
        assert!(validator.validate("AX").suggestions().is_empty());

        let lenient = AircraftTypeValidator::new(&vocab).with_limits(MAX_SUGGESTIONS, 0.4);
        assert_eq!(lenient.validate("AX").suggested_codes(), vec!["AB"]);
    }

    // ── similarity ────────────────────────────────────────────────────────────

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("C1722", "C172"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "ABC"), 3);
        assert_eq!(levenshtein_distance("SAME", "SAME"), 0);
    }

    #[test]
    fn test_similarity_bounds() {
        assert!((similarity("C1722", "C172") - 0.8).abs() < 1e-9);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("AB", "CD"), 0.0);
    }
}
