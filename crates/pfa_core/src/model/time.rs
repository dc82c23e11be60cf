//! ISO-8601 timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats an instant the way records store it: `2024-05-01T09:30:00.000Z`.
pub fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_iso() -> String {
    to_iso(Utc::now())
}

/// Parses a stored timestamp. Offsets other than `Z` are normalized to UTC.
pub fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
