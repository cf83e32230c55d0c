//! Date parsing for range filters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a record or filter value as a point in time (UTC, naive).
///
/// Numbers are epoch milliseconds. Strings may be RFC 3339, `YYYY-MM-DD`, or
/// an ISO-like date-time without offset.
pub fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        Value::String(s) => parse_datetime_str(s),
        _ => None,
    }
}

pub fn parse_datetime_str(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn start_of_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_hms_opt(0, 0, 0).unwrap_or(dt)
}

/// 23:59:59.999 on the same day.
pub fn end_of_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_hms_milli_opt(23, 59, 59, 999).unwrap_or(dt)
}
