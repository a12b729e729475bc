//! Timestamp parsing and formatting shared by storage and seed loading.
//!
//! Timestamps are stored as UTC text in [`STORAGE_FORMAT`]. Reading is more
//! lenient: older databases and seed files carry seconds-only SQLite
//! `CURRENT_TIMESTAMP` values, RFC 3339 strings, or integer epochs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Timestamp type used across the workspace.
pub type Timestamp = DateTime<Utc>;

/// Text layout written to the database. Sorts lexicographically in time order.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Epoch values at or above this magnitude are read as milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Formats a timestamp for storage.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use interview_deck_core::format_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
/// assert_eq!(format_timestamp(&ts), "2024-03-01 08:30:00.000");
/// ```
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Parses a stored or seeded timestamp.
///
/// Accepts [`STORAGE_FORMAT`], its seconds-only form, RFC 3339, `T`-separated
/// naive datetimes, bare dates, and integer epochs in seconds or
/// milliseconds. Returns `None` for anything else.
///
/// # Examples
///
/// ```
/// use interview_deck_core::parse_timestamp;
///
/// assert!(parse_timestamp("2024-03-01 08:30:00").is_some());
/// assert!(parse_timestamp("2024-03-01T08:30:00.000Z").is_some());
/// assert!(parse_timestamp("1709281800").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    raw.parse::<i64>().ok().and_then(from_epoch)
}

/// Converts an integer epoch in seconds or milliseconds.
pub fn from_epoch(value: i64) -> Option<Timestamp> {
    if value.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}
