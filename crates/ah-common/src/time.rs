//! Timestamp and duration parsing.
//!
//! All engine timestamps are epoch milliseconds (UTC). Parsing never panics;
//! anything unrecognised yields `None` so callers can degrade gracefully.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{Error, Result};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string into epoch milliseconds.
///
/// Accepted forms, in order: RFC 3339, offset datetime with a space
/// separator, naive datetime (taken as UTC), bare date, integer epoch ms.
pub fn parse_timestamp(input: &str) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.timestamp_millis());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
    }

    let digits = s.strip_prefix('-').unwrap_or(s);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok();
    }

    None
}

/// Resolve a loosely typed JSON timestamp.
///
/// Strings are parsed with [`parse_timestamp`]; numbers are epoch ms.
pub fn parse_timestamp_value(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::String(s) => parse_timestamp(s),
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        _ => None,
    }
}

/// Render epoch milliseconds as RFC 3339 (UTC, millisecond precision).
pub fn format_timestamp(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => ms.to_string(),
    }
}

/// Parse a duration like `500ms`, `90s`, `10m`, `2h`, `7d` into milliseconds.
///
/// A bare integer is taken as milliseconds.
pub fn parse_duration(input: &str) -> Result<i64> {
    let s = input.trim();
    let err = || Error::InvalidDuration(input.to_string());
    if s.is_empty() {
        return Err(err());
    }

    let (num_str, unit_ms) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, MS_PER_SECOND)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, MS_PER_MINUTE)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, MS_PER_HOUR)
    } else if let Some(n) = s.strip_suffix('d') {
        (n, MS_PER_DAY)
    } else {
        (s, 1)
    };

    let num: i64 = num_str.trim().parse().map_err(|_| err())?;
    if num < 0 {
        return Err(err());
    }
    num.checked_mul(unit_ms).ok_or_else(err)
}
