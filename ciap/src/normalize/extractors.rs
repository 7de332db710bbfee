//! Value parsers used by the normalization cascades.
//!
//! Each parser accepts one JSON value and either yields a usable field value
//! or `None`, letting the cascade move on to the next candidate.

use crate::discovery::field_mapping::{LEADING_ISO_DATE, TRANSCRIPT_MIN_CHARS};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("static regex")
});

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A string with visible content, returned as-is.
pub fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
}

/// A string with visible content, trimmed.
pub fn trimmed_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Trimmed text long enough to be a transcript rather than a label.
pub fn transcript_text(value: &Value) -> Option<String> {
    trimmed_string(value).filter(|s| s.chars().count() > TRANSCRIPT_MIN_CHARS)
}

/// Lenient float parsing: numbers as-is, strings by their leading numeric
/// prefix ("42%" is 42). Non-finite results are rejected.
pub fn lenient_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => LEADING_FLOAT
            .find(s.trim_start())
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// A calendar date from a string in one of the accepted layouts.
///
/// Timestamps with an offset are converted to UTC before taking the date.
/// Anything else that starts with `YYYY-MM-DD` yields that leading date.
pub fn calendar_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.date());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }
    LEADING_ISO_DATE
        .find(raw)
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
}

/// Like [`calendar_date`], plus positive epoch milliseconds.
pub fn calendar_date_or_epoch(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .filter(|millis| *millis > 0)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => calendar_date(value),
    }
}

/// A non-empty list of strings, or one non-empty string wrapped as a list.
///
/// Non-string array elements are dropped; an array left empty does not match.
pub fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => {
            let strings: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect();
            (!strings.is_empty()).then_some(strings)
        }
        Value::String(_) => trimmed_string(value).map(|s| vec![s]),
        _ => None,
    }
}

/// A boolean, or the strings "true"/"false".
pub fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strings() {
        assert_eq!(non_empty_string(&json!("  Pat ")), Some("  Pat ".to_string()));
        assert_eq!(trimmed_string(&json!("  Pat ")), Some("Pat".to_string()));
        assert_eq!(trimmed_string(&json!("   ")), None);
        assert_eq!(trimmed_string(&json!(12)), None);
    }

    #[test]
    fn test_transcript_threshold() {
        assert_eq!(transcript_text(&json!("hi")), None);
        assert_eq!(transcript_text(&json!("a".repeat(50))), None);
        assert!(transcript_text(&json!("a".repeat(51))).is_some());
    }

    #[test]
    fn test_lenient_number() {
        assert_eq!(lenient_number(&json!(10)), Some(10.0));
        assert_eq!(lenient_number(&json!(2.5)), Some(2.5));
        assert_eq!(lenient_number(&json!(" 42%")), Some(42.0));
        assert_eq!(lenient_number(&json!("-.5e1x")), Some(-5.0));
        assert_eq!(lenient_number(&json!("abc")), None);
        assert_eq!(lenient_number(&json!("Infinity")), None);
        assert_eq!(lenient_number(&json!(true)), None);
        assert_eq!(lenient_number(&json!(null)), None);
    }

    #[test]
    fn test_calendar_date() {
        let d = |s: &str| calendar_date(&json!(s)).map(|d| d.to_string());
        assert_eq!(d("2024-01-15"), Some("2024-01-15".into()));
        assert_eq!(d("2024-01-15T23:30:00-05:00"), Some("2024-01-16".into()));
        assert_eq!(d("2024-01-15T10:00:00.123"), Some("2024-01-15".into()));
        assert_eq!(d("2024-01-15 10:00:00"), Some("2024-01-15".into()));
        assert_eq!(d("2024/01/15"), Some("2024-01-15".into()));
        assert_eq!(d("01/15/2024"), Some("2024-01-15".into()));
        assert_eq!(d("2024-01-15T10:00:00+0000"), Some("2024-01-15".into()));
        assert_eq!(d("2024-01-15T22:00:00.000-0500"), Some("2024-01-16".into()));
        assert_eq!(d("2024-01-15 10:00:00+0100"), Some("2024-01-15".into()));
        assert_eq!(d("2024-01-15 10:00:00 UTC"), Some("2024-01-15".into()));
        assert_eq!(d("2024-01-15-ish"), Some("2024-01-15".into()));
        assert_eq!(d("2024-13-45"), None);
        assert_eq!(d("2024-13-45 10:00"), None);
        assert_eq!(d("yesterday"), None);
        assert_eq!(calendar_date(&json!(1705312800000i64)), None);
    }

    #[test]
    fn test_calendar_date_or_epoch() {
        let d = |v: Value| calendar_date_or_epoch(&v).map(|d| d.to_string());
        assert_eq!(d(json!(1705312800000i64)), Some("2024-01-15".into()));
        assert_eq!(d(json!(1705312800000.0)), Some("2024-01-15".into()));
        assert_eq!(d(json!("2024-01-15")), Some("2024-01-15".into()));
        assert_eq!(d(json!(0)), None);
        assert_eq!(d(json!(-5)), None);
        assert_eq!(d(json!(1e300)), None);
        assert_eq!(d(json!(true)), None);
    }

    #[test]
    fn test_string_list() {
        assert_eq!(
            string_list(&json!(["a", 1, "b"])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(string_list(&json!([1, 2])), None);
        assert_eq!(string_list(&json!([])), None);
        assert_eq!(string_list(&json!(" tip ")), Some(vec!["tip".to_string()]));
        assert_eq!(string_list(&json!("")), None);
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean(&json!(false)), Some(false));
        assert_eq!(boolean(&json!("TRUE")), Some(true));
        assert_eq!(boolean(&json!(1)), None);
    }
}
