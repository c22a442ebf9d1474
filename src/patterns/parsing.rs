//! Utility functions for turning captured text and raw header values into typed field values.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Parses a calendar date as it appears in folder and file names.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let formats = ["%Y-%m-%d", "%Y%m%d", "%Y_%m_%d", "%Y.%m.%d"];
    let s = s.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parses a capture timestamp from a filename token or a header value.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y%m%d-%H%M%S",
        "%Y%m%d_%H%M%S",
        "%Y-%m-%d_%H-%M-%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y:%m:%d %H:%M:%S%.f",
    ];
    let s = s.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a decimal number or a fraction such as `1/250`.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Some((num, den)) = s.split_once('/') {
        let (Ok(num), Ok(den)) = (num.trim().parse::<f64>(), den.trim().parse::<f64>()) else {
            return None;
        };
        return (den != 0.0).then(|| num / den).filter(|v| v.is_finite());
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads a number from a JSON value that may hold it as a number or as text.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Reads an integer, accepting floats without a fractional part (`100.0`).
pub fn value_to_i64(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    value_to_f64(value)
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Reads a non-empty, trimmed string.
pub fn value_to_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Exposure times must be finite and not negative.
pub fn valid_exposure(seconds: f64) -> Option<f64> {
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}
