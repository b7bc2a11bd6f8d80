//! Calendar date codec for `YYYY-MM-DD` keys.
//!
//! # Invariants
//! - Keys carry no time-zone; a key names a local calendar day.
//! - `parse_date(&format_as_key(d)) == Some(d)` for every representable date.

use chrono::{Local, NaiveDate};

const KEY_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%b %-d, %Y";

/// Parses a `YYYY-MM-DD` key into a calendar date.
///
/// Returns `None` for anything that is not a real calendar day in that exact
/// shape (`2025-02-30`, `2025-2-1`, empty input).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, KEY_FORMAT).ok()
}

/// Formats a calendar date as a zero-padded `YYYY-MM-DD` key.
pub fn format_as_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

/// Formats a date key for display, e.g. `2025-03-07` -> `Mar 7, 2025`.
///
/// Unparseable keys are returned unchanged.
pub fn format_display(value: &str) -> String {
    match parse_date(value) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => value.to_string(),
    }
}

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Signed whole days from today to `value`; positive when `value` is ahead.
pub fn days_diff(value: &str) -> Option<i64> {
    days_diff_from(value, today())
}

/// Signed whole days from `today` to `value`.
///
/// Both bounds are calendar days, so time-of-day can never shift the result.
pub fn days_diff_from(value: &str, today: NaiveDate) -> Option<i64> {
    parse_date(value).map(|date| date.signed_duration_since(today).num_days())
}
