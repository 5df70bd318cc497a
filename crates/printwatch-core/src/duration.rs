//! Human-friendly duration strings used in `printwatch.toml`.

use std::time::Duration;

/// Parse a duration string like "3s", "500ms", "2m", "1h".
///
/// A bare number is read as seconds. Returns `None` for anything else,
/// including values too large to represent.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.trim().parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.trim().parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        scaled_secs(mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        scaled_secs(hours, 3600)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

fn scaled_secs(value: &str, unit: u64) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|v| v.checked_mul(unit))
        .map(Duration::from_secs)
}
