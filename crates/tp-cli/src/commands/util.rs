//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(second|minute|hour|day|week)s?\s+ago$").unwrap()
});

/// Conservative bounds for relative time parsing (~1000 years in seconds).
const MAX_RELATIVE_SECONDS: i64 = 1000 * 365 * 24 * 60 * 60;

/// Parse a datetime string as either RFC 3339 or relative time.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z", "2026-01-15T12:30:00+02:00"
/// - Relative: "90 seconds ago", "30 minutes ago", "2 hours ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    parse_datetime_at(s, Utc::now())
}

fn parse_datetime_at(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = tp_core::parse_timestamp(s) {
        return Ok(dt);
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid timestamp format: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match &caps[2] {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 60 * 60 * 24,
        "week" => 60 * 60 * 24 * 7,
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > MAX_RELATIVE_SECONDS / seconds_per_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::seconds(n * seconds_per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_datetime_at("2026-01-15T12:30:00+02:00", now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn parses_relative_units() {
        assert_eq!(
            parse_datetime_at("30 minutes ago", now()).unwrap(),
            now() - Duration::minutes(30)
        );
        assert_eq!(
            parse_datetime_at("1 hour ago", now()).unwrap(),
            now() - Duration::hours(1)
        );
        assert_eq!(
            parse_datetime_at("90 seconds ago", now()).unwrap(),
            now() - Duration::seconds(90)
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_datetime_at("last tuesday", now()).unwrap_err();
        assert!(err.to_string().contains("Invalid timestamp format"));
    }

    #[test]
    fn rejects_oversized_relative_values() {
        let err = parse_datetime_at("99999999 weeks ago", now()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
