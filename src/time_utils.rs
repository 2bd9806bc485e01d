//! Calendar-day arithmetic shared by break detection and cause attribution
//!
//! All funnel data is day-granular, so every distance here is a whole number
//! of days between two `NaiveDate`s.

use chrono::NaiveDate;

/// Wire format for dates in inputs and outputs
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Signed number of days from `earlier` to `later`
///
/// Negative when `earlier` is actually after `later`.
pub fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Half-open window membership: `lower <= gap < upper`
pub fn within_window(gap: i64, lower: i64, upper: i64) -> bool {
    gap >= lower && gap < upper
}

/// Parse a strict `YYYY-MM-DD` date
///
/// chrono accepts unpadded fields such as `2024-3-1`; those are rejected so
/// that lexicographic and chronological order stay the same.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if trimmed.len() != 10 {
        return Err(format!("invalid date '{}' (expected YYYY-MM-DD)", raw));
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map_err(|e| format!("invalid date '{}': {}", raw, e))
}
