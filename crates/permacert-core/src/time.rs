//! Wall-clock helpers.

use chrono::{SecondsFormat, TimeZone, Utc};

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render Unix milliseconds as an ISO-8601 UTC timestamp with millisecond
/// precision, e.g. `2024-05-01T12:00:00.000Z`.
///
/// Out-of-range inputs render as the Unix epoch.
pub fn to_iso8601(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
