// Utility helpers for parsing and number formatting.
//
// This module centralizes the "dirty" CSV number/date handling so the
// pipeline can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use num_format::{Locale, ToFormattedString};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces).
///
/// Returns `None` for empty cells and for anything that cannot be parsed.
/// Callers that need to tell the two apart should check `is_missing` first.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Keep exponents, but not words like "nan" or "inf" that `f64` would accept.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

/// Serde adapter for numeric cells that may carry thousands separators.
/// Empty cells become `None`; anything else must parse.
pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None => Ok(None),
        Some(s) if is_missing(s) => Ok(None),
        Some(s) => parse_f64_safe(Some(s))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid number {:?}", s))),
    }
}

/// An empty (or whitespace-only) cell is a missing value, not a bad one.
pub fn is_missing(s: &str) -> bool {
    s.trim().is_empty()
}

/// Parse a date cell in any of the layouts the sources have been seen to use.
///
/// Datetimes are converted to UTC before the date is taken.
pub fn parse_date_flexible(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    None
}

/// Canonical representation written back into date columns.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234,567.89`).
    if !n.is_finite() {
        return "NaN".to_string();
    }
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console and log messages (e.g. `9,855 rows`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_with_separators() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[derive(Deserialize)]
    struct Cell {
        #[serde(default, deserialize_with = "deserialize_lenient_f64")]
        n: Option<f64>,
    }

    fn read_cells(text: &str) -> Vec<Result<Cell, csv::Error>> {
        csv::Reader::from_reader(text.as_bytes()).deserialize().collect()
    }

    #[test]
    fn lenient_cells_accept_separators_and_blanks() {
        let cells = read_cells("n\n\"15,000\"\n\n2.5\n");
        let values: Vec<Option<f64>> = cells.into_iter().map(|c| c.unwrap().n).collect();
        assert_eq!(values, [Some(15_000.0), Some(2.5)]);
        let blank = read_cells("n,m\n,1\n");
        assert_eq!(blank[0].as_ref().unwrap().n, None);
    }

    #[test]
    fn lenient_cells_reject_words() {
        let cells = read_cells("n\nlots\n");
        assert!(cells[0].is_err());
    }

    #[test]
    fn parses_supported_date_layouts() {
        let want = NaiveDate::from_ymd_opt(2021, 12, 13).unwrap();
        assert_eq!(parse_date_flexible("2021-12-13"), Some(want));
        assert_eq!(parse_date_flexible("2021/12/13"), Some(want));
        assert_eq!(parse_date_flexible("2021-12-13 08:30:00"), Some(want));
        assert_eq!(parse_date_flexible("2021-12-13T23:30:00-01:00"), Some(NaiveDate::from_ymd_opt(2021, 12, 14).unwrap()));
        assert_eq!(parse_date_flexible("13 Dec"), None);
        assert_eq!(parse_date_flexible(" "), None);
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-0.5, 1), "-0.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(f64::NAN, 2), "NaN");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
