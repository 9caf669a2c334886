//! Human-friendly timestamp formatting for thread and reply metadata.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamps older than this render as an absolute date.
const RELATIVE_CUTOFF_DAYS: i64 = 7;

/// Format a stored timestamp for display.
///
/// Recent timestamps render relative ("3h ago"); anything older than a week
/// renders as an absolute date. Unparseable input is shown as-is rather than
/// breaking the page.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => format_relative(ts, Utc::now()),
        None => raw.to_string(),
    }
}

/// Parse the two timestamp shapes the database produces: SQLite's
/// `datetime('now')` format and RFC 3339.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(ts);

    if elapsed.num_seconds() < 60 {
        return "just now".to_string();
    }
    if elapsed.num_minutes() < 60 {
        return format!("{}m ago", elapsed.num_minutes());
    }
    if elapsed.num_hours() < 24 {
        return format!("{}h ago", elapsed.num_hours());
    }
    if elapsed.num_days() <= RELATIVE_CUTOFF_DAYS {
        return format!("{}d ago", elapsed.num_days());
    }

    ts.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_just_now() {
        let now = at(2024, 3, 10, 12, 0, 0);
        assert_eq!(format_relative(at(2024, 3, 10, 11, 59, 30), now), "just now");
    }

    #[test]
    fn test_minutes_hours_days() {
        let now = at(2024, 3, 10, 12, 0, 0);
        assert_eq!(format_relative(at(2024, 3, 10, 11, 15, 0), now), "45m ago");
        assert_eq!(format_relative(at(2024, 3, 10, 3, 0, 0), now), "9h ago");
        assert_eq!(format_relative(at(2024, 3, 7, 12, 0, 0), now), "3d ago");
    }

    #[test]
    fn test_absolute_past_the_cutoff() {
        let now = at(2024, 3, 10, 12, 0, 0);
        assert_eq!(format_relative(at(2024, 2, 1, 12, 0, 0), now), "Feb 1, 2024");
    }

    #[test]
    fn test_parses_sqlite_and_rfc3339() {
        assert!(parse_timestamp("2024-03-10 12:00:00").is_some());
        assert!(parse_timestamp("2024-03-10T12:00:00+00:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(format_timestamp("pending"), "pending");
    }
}
