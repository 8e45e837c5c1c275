//! Datetime normalization: coerce client-supplied timestamps into UTC-aware values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

// Spellings that carry an offset but fall outside strict RFC 3339
// (colonless offsets such as "+0200").
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z"];

// Naive spellings, recognized only so they can be rejected with a precise message.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Normalize an ISO 8601 timestamp string to a UTC-aware value.
///
/// Accepts RFC 3339 input (including the `Z` suffix) and the space-separated
/// ISO 8601 variant, as long as an explicit UTC offset is present; any offset
/// is converted to UTC. Blank, timezone-naive and malformed input is rejected.
pub fn ensure_utc(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Datetime string cannot be empty".to_string());
    }

    // ISO 8601 allows a space in place of the 'T' date/time separator.
    let normalized = value.replacen(' ', "T", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    if is_naive(&normalized) {
        return Err(
            "Timezone-naive datetime not allowed. Please provide timezone information.".to_string(),
        );
    }

    Err("Invalid datetime format. Use ISO 8601 format with timezone.".to_string())
}

fn is_naive(value: &str) -> bool {
    NAIVE_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
