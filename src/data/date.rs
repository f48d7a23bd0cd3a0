//! Date parsing and calendar-month arithmetic.
//!
//! Everything downstream of the loader works on [`NaiveDate`] at day granularity; timestamps are
//! floored to the UTC day they fall on.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Floor a Unix timestamp in seconds to its UTC day.
pub fn date_from_unix_secs(secs: f64) -> Option<NaiveDate> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, 0).map(|dt| dt.date_naive())
}

/// Parse a date string in any of the accepted layouts.
///
/// Accepted: Unix seconds written as a number, RFC 3339, `YYYY-MM-DD[ T]HH:MM[:SS[.f]]`,
/// `YYYY-MM-DD`, and `YYYY-MM` (first of the month).
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<f64>() {
        return date_from_unix_secs(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
}

/// Parse a JSON date value: numbers are Unix seconds, strings go through [`parse_date_str`].
pub fn parse_date_value(value: &serde_json::Value) -> Option<NaiveDate> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().and_then(date_from_unix_secs),
        serde_json::Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn days_in_month(d: NaiveDate) -> u32 {
    u32::from(d.num_days_in_month())
}

/// Months since year 0; differences give elapsed whole calendar months.
pub fn month_ordinal(d: NaiveDate) -> i64 {
    i64::from(d.year()) * 12 + i64::from(d.month0())
}

/// Day-granularity formatting used by frame labels and summaries.
pub fn format_day(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
