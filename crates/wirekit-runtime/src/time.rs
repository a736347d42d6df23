//! Timestamp parsing
//!
//! Accepted layouts, tried in order:
//!
//! | Layout | Example |
//! |---|---|
//! | RFC 3339 | `2024-05-01T12:30:00Z`, `2024-05-01T12:30:00.5+02:00` |
//! | date and time, `T` separator | `2024-05-01T12:30:00` |
//! | date and time, space separator | `2024-05-01 12:30:00.250` |
//! | date only | `2024-05-01` (midnight UTC) |
//!
//! Inputs without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_LAYOUT: &str = "%Y-%m-%d";

/// No accepted layout matched the input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {value:?} as a timestamp: no recognized layout matched")]
pub struct TimestampError {
    /// The rejected input
    pub value: String,
}

/// Parse a timestamp in any of the accepted layouts
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, layout) {
            return Ok(ts.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_LAYOUT) {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(TimestampError {
        value: value.to_string(),
    })
}
