//! Timestamp parsing and normalization
//!
//! Request parameters and response cells share one notion of a "recognized
//! timestamp". Anything parsed here is rendered back to the API as
//! `%Y-%m-%dT%H:%M:%S`.
//!
//! The two sides treat offsets differently. Request arguments keep the
//! wall-clock time the caller wrote; response cells are converted to UTC so
//! distinct instants stay distinct across DST changes.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// Format used when sending timestamps to the API
pub const REQUEST_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a string in any recognized timestamp format.
///
/// Offsets are dropped and the wall-clock time is kept, so
/// `2021-01-01T05:00:00-05:00` becomes `2021-01-01T05:00:00`.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    parse_with(s, |dt| dt.naive_local())
}

/// Parse a response cell. Offset-bearing values are converted to UTC, so
/// `2022-11-06T01:00:00-05:00` becomes `2022-11-06T06:00:00`.
pub fn parse_cell_timestamp(s: &str) -> Option<NaiveDateTime> {
    parse_with(s, |dt| dt.naive_utc())
}

fn parse_with(
    s: &str,
    with_offset: fn(&DateTime<FixedOffset>) -> NaiveDateTime,
) -> Option<NaiveDateTime> {
    let s = s.trim();
    // Cheap rejection for plain numbers and words
    if s.len() < 8 || !s.as_bytes()[0].is_ascii_digit() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(with_offset(&dt));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Check if a string is a recognized timestamp
pub fn is_timestamp(s: &str) -> bool {
    parse_timestamp(s).is_some()
}

/// Render a timestamp the way the API expects it
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(REQUEST_FORMAT).to_string()
}

/// Parse and re-render a timestamp string in the request format
pub fn normalize_timestamp(s: &str) -> Option<String> {
    parse_timestamp(s).map(|dt| format_timestamp(&dt))
}
