//! Utility functions for date normalization of store rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Extract the calendar date a row belongs to.
///
/// Accepts:
/// - YYYY-MM-DD (date columns) -> that date
/// - RFC3339 datetime (timestamptz columns) -> the UTC calendar date of the instant
/// - Naive datetime YYYY-MM-DDTHH:MM:SS[.fff] or with a space separator -> its own date
pub fn day_key(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    // PostgREST renders `+00` offsets without minutes.
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }
    None
}
