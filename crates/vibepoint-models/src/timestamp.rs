//! Timestamp parsing and formatting utilities.
//!
//! The backend emits ISO-8601 timestamps in two flavours: RFC 3339 with an
//! offset (`2025-10-04T12:30:00Z`) and naive `datetime.isoformat()` output
//! without one. Naive values are UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a backend timestamp. Returns `None` for anything unparseable.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format seconds as a `m:ss` clock label.
///
/// # Examples
/// ```
/// use vibepoint_models::timestamp::format_clock;
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(75.9), "1:15");
/// assert_eq!(format_clock(3600.0), "60:00");
/// ```
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
