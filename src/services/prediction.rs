//! Purchase cadence: average gap between purchases and the projected next one.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse a stored or user-supplied timestamp.
///
/// Accepts `2024-01-01`, `2024-01-01 10:30:00`, `2024-01-01T10:30:00`, with
/// optional fractional seconds, and RFC 3339 offsets (converted to UTC).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    let normalized = trimmed.replacen('T', " ", 1);
    let normalized = normalized.trim_end_matches('Z');

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(normalized, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Average whole-day gap between consecutive purchases.
///
/// Same-day repeats (and out-of-order entries) are dropped; `None` when no
/// positive gap remains.
pub fn average_interval_days(purchases: &[NaiveDateTime]) -> Option<i64> {
    if purchases.len() < 2 {
        return None;
    }

    let gaps: Vec<i64> = purchases
        .windows(2)
        .map(|pair| (pair[1].date() - pair[0].date()).num_days())
        .filter(|days| *days > 0)
        .collect();

    if gaps.is_empty() {
        return None;
    }

    let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
    Some(mean.round() as i64)
}

/// Projected date of the next purchase.
///
/// A positive `target_frequency_days` wins over the observed average.
pub fn predict_next_purchase(
    target_frequency_days: Option<i32>,
    last_purchase: Option<NaiveDateTime>,
    purchases: &[NaiveDateTime],
) -> Option<NaiveDate> {
    let last = last_purchase?;

    let frequency = target_frequency_days
        .filter(|days| *days > 0)
        .map(i64::from)
        .or_else(|| average_interval_days(purchases))?;

    last.date().checked_add_signed(Duration::days(frequency))
}
