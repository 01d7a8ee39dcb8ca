//! Timestamp parsing for job dates.
//!
//! Job dates arrive from browsers and scripts in several shapes. This module
//! accepts:
//! - RFC 3339 (`2025-01-31T09:30:00Z`, `2025-01-31T09:30:00+02:00`)
//! - naive date-time, read as UTC (`2025-01-31T09:30:00`, `2025-01-31T09:30:00.250`)
//! - plain date, read as midnight UTC (`2025-01-31`)
//!
//! Output is always RFC 3339 via chrono's serializer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};
use thiserror::Error;

/// Errors from timestamp parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,

    #[error("unrecognized timestamp format: {0}")]
    InvalidFormat(String),
}

/// Parse a timestamp in any of the accepted shapes.
///
/// # Examples
/// ```
/// use jobboard_models::timestamp::parse_timestamp;
/// let ts = parse_timestamp("2025-01-31").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2025-01-31T00:00:00+00:00");
/// ```
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(TimestampError::InvalidFormat(raw.to_string()))
}

/// Serde helper for optional timestamps.
///
/// `null`, a missing field, and an empty string all read as `None`.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s).map(Some).map_err(D::Error::custom),
    }
}
