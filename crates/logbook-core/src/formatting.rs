/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use logbook_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge exact midpoints so 1.05 rounds to 1.1 rather than 1.0.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();
    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Decimal hours as logged, one decimal place: `1,234.5`.
pub fn format_hours(hours: f64) -> String {
    format_number(hours, 1)
}

/// Decimal hours as `H:MM`, rounded to the nearest minute.
///
/// # Examples
///
/// ```
/// use logbook_core::formatting::format_hhmm;
///
/// assert_eq!(format_hhmm(1.5), "1:30");
/// assert_eq!(format_hhmm(0.25), "0:15");
/// assert_eq!(format_hhmm(12.0), "12:00");
/// ```
pub fn format_hhmm(hours: f64) -> String {
    let total_mins = (hours.max(0.0) * 60.0).round() as i64;
    format!("{}:{:02}", total_mins / 60, total_mins % 60)
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounds_to_zero() {
        assert_eq!(format_number(-0.01, 1), "0.0");
    }

    // ── format_hours ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(1.25), "1.3");
        assert_eq!(format_hours(1_502.0), "1,502.0");
        assert_eq!(format_hours(0.0), "0.0");
    }

    // ── format_hhmm ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_hhmm_rounds_to_minute() {
        assert_eq!(format_hhmm(1.0 / 3.0), "0:20");
        assert_eq!(format_hhmm(2.99), "2:59");
    }

    #[test]
    fn test_format_hhmm_negative_clamps() {
        assert_eq!(format_hhmm(-1.0), "0:00");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0, 1);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }
}
