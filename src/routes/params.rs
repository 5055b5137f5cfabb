// Timestamp and count parameter handling for the /data endpoints.
// The accepted timestamp shape is deliberately narrow: UTC only, trailing
// 'Z' required, optional millisecond fraction.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};

/// Parses "YYYY-MM-DDTHH:MM:SSZ" or "YYYY-MM-DDTHH:MM:SS.sssZ".
/// Rejects offsets, missing 'Z', and years outside 1970..=3000.
pub fn parse_iso8601_utc(value: &str) -> Option<DateTime<Utc>> {
    let without_zone = value.strip_suffix('Z')?;
    if without_zone.len() < 19 {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(without_zone, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    if !(1970..=3000).contains(&naive.year()) {
        return None;
    }
    Some(Utc.from_utc_datetime(&naive))
}

/// Formats a UTC timestamp the way responses always have: seconds precision,
/// with a ".mmm" fraction only when the millisecond component is nonzero.
pub fn format_iso8601(ts: DateTime<Utc>) -> String {
    if ts.timestamp_subsec_millis() > 0 {
        ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Parses the `count` query parameter: a positive integer within
/// `1..=max`. None means out of range or not a number.
pub fn parse_count(value: &str, max: u32) -> Option<u32> {
    let count: u32 = value.parse().ok()?;
    (1..=max).contains(&count).then_some(count)
}
