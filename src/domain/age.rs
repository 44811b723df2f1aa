//! Pool Age Helpers
//!
//! Converts provider-supplied pool-creation timestamps into both a compound
//! human-readable duration and raw seconds. Pure functions, deterministic for
//! a given pair of instants.

/// Format an age in seconds as a compound duration string.
///
/// Zero-valued leading units are omitted and the seconds component is always
/// present: `0` -> `"0s"`, `3661` -> `"1h 1m 1s"`, `172800` -> `"2d 0h 0m 0s"`.
pub fn format_age(age_seconds: u64) -> String {
    let days = age_seconds / 86_400;
    let hours = (age_seconds % 86_400) / 3_600;
    let minutes = (age_seconds % 3_600) / 60;
    let seconds = age_seconds % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || !parts.is_empty() {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}

/// Compute (human age, age in seconds) from a creation epoch in milliseconds.
///
/// A creation timestamp in the future clamps to zero rather than underflowing.
pub fn age_from_created_at(created_at_ms: i64, now_ms: i64) -> (String, u64) {
    let age_seconds = ((now_ms - created_at_ms).max(0) / 1000) as u64;
    (format_age(age_seconds), age_seconds)
}

/// Current Unix time in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
