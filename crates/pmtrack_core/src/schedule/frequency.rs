//! Recurrence frequency codes and due-date advancement.
//!
//! # Responsibility
//! - Recognize the two frequency families: custom `<n><unit>` and the legacy
//!   month codes (`1m`, `2m`, `3m`, `6m`).
//! - Advance a date key by a frequency.
//! - Map a frequency to its day-length and display label.
//!
//! # Invariants
//! - The custom pattern is always checked before the legacy table, so `1w`
//!   and `1y` resolve as custom codes.
//! - Legacy month advancement clamps to the last day of the target month.
//! - Custom month/year advancement does not clamp: a missing day rolls into
//!   the following month (`2025-01-31` + `3mo` -> `2025-05-01`).
//! - Unrecognized codes never fail: `next_due_date` is the identity and
//!   `total_days` falls back to 30.

use crate::schedule::date::{format_as_key, parse_date};
use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static CUSTOM_FREQUENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)(d|w|mo|y)$").expect("valid custom frequency regex"));

/// Day-length used for codes neither family recognizes.
pub const UNKNOWN_FREQUENCY_DAYS: i64 = 30;

/// Unit of a custom `<n><unit>` frequency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyUnit {
    Day,
    Week,
    Month,
    Year,
}

impl FrequencyUnit {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "d" => Some(Self::Day),
            "w" => Some(Self::Week),
            "mo" => Some(Self::Month),
            "y" => Some(Self::Year),
            _ => None,
        }
    }

    fn nominal_days(self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    fn noun(self, count: u32) -> &'static str {
        match (self, count == 1) {
            (Self::Day, true) => "Day",
            (Self::Day, false) => "Days",
            (Self::Week, true) => "Week",
            (Self::Week, false) => "Weeks",
            (Self::Month, true) => "Month",
            (Self::Month, false) => "Months",
            (Self::Year, true) => "Year",
            (Self::Year, false) => "Years",
        }
    }
}

/// Month-based codes that predate the custom format.
///
/// `1w` and `1y` also existed in the legacy set but are shadowed by the custom
/// pattern, so they never reach this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyCode {
    OneMonth,
    TwoMonths,
    ThreeMonths,
    SixMonths,
}

impl LegacyCode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "1m" => Some(Self::OneMonth),
            "2m" => Some(Self::TwoMonths),
            "3m" => Some(Self::ThreeMonths),
            "6m" => Some(Self::SixMonths),
            _ => None,
        }
    }

    /// Whole months this code advances by.
    pub fn months(self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::TwoMonths => 2,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
        }
    }

    fn total_days(self) -> i64 {
        match self {
            Self::OneMonth => 30,
            Self::TwoMonths => 60,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
        }
    }
}

/// Parsed frequency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Custom { count: u32, unit: FrequencyUnit },
    Legacy(LegacyCode),
}

impl Frequency {
    /// Parses a frequency code, custom pattern first.
    ///
    /// Counts that do not fit in `u32` are treated as unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        parse_custom(value).or_else(|| LegacyCode::parse(value).map(Self::Legacy))
    }

    /// Equivalent cycle length used for warning windows.
    pub fn total_days(self) -> i64 {
        match self {
            Self::Custom { count, unit } => i64::from(count) * unit.nominal_days(),
            Self::Legacy(code) => code.total_days(),
        }
    }

    /// Display label, covering the legacy month codes too.
    pub fn label(self) -> String {
        match self {
            Self::Custom { count, unit } => custom_label(count, unit),
            Self::Legacy(code) => custom_label(code.months(), FrequencyUnit::Month),
        }
    }
}

fn parse_custom(value: &str) -> Option<Frequency> {
    let captures = CUSTOM_FREQUENCY_RE.captures(value)?;
    let count = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let unit = FrequencyUnit::parse(captures.get(2)?.as_str())?;
    Some(Frequency::Custom { count, unit })
}

fn custom_label(count: u32, unit: FrequencyUnit) -> String {
    format!("{count} {}", unit.noun(count))
}

/// Computes the next due date key for `from_date` advanced by `freq`.
///
/// Custom codes go through [`advance_custom`]; legacy month codes clamp to
/// month end; anything else (including an unparseable `from_date`) returns
/// `from_date` unchanged.
pub fn next_due_date(from_date: &str, freq: &str) -> String {
    if CUSTOM_FREQUENCY_RE.is_match(freq) {
        return advance_custom(from_date, freq);
    }

    let Some(code) = LegacyCode::parse(freq) else {
        return from_date.to_string();
    };
    parse_date(from_date)
        .and_then(|from| add_months_clamped(from, code.months()))
        .map(format_as_key)
        .unwrap_or_else(|| from_date.to_string())
}

/// Advances `from_date` by a custom `<n><unit>` code without month-end clamping.
///
/// Returns `from_date` unchanged when `freq` is not a custom code.
pub fn advance_custom(from_date: &str, freq: &str) -> String {
    let Some(Frequency::Custom { count, unit }) = parse_custom(freq) else {
        return from_date.to_string();
    };
    parse_date(from_date)
        .and_then(|from| advance_by_unit(from, count, unit))
        .map(format_as_key)
        .unwrap_or_else(|| from_date.to_string())
}

/// Equivalent day-length of `freq`; unrecognized codes map to 30.
pub fn total_days(freq: &str) -> i64 {
    Frequency::parse(freq).map_or(UNKNOWN_FREQUENCY_DAYS, Frequency::total_days)
}

/// Display label for custom codes (`14d` -> `14 Days`, `1y` -> `1 Year`).
///
/// Legacy month codes and unknown codes are returned unchanged; see
/// [`describe_frequency`] for a label that covers them.
pub fn label_for(freq: &str) -> String {
    match parse_custom(freq) {
        Some(Frequency::Custom { count, unit }) => custom_label(count, unit),
        _ => freq.to_string(),
    }
}

/// Display label for any recognized code, legacy month codes included.
///
/// Used when a task is created so its cached `freqLabel` is never a raw code.
pub fn describe_frequency(freq: &str) -> String {
    Frequency::parse(freq).map_or_else(|| freq.to_string(), Frequency::label)
}

fn advance_by_unit(from: NaiveDate, count: u32, unit: FrequencyUnit) -> Option<NaiveDate> {
    match unit {
        FrequencyUnit::Day => from.checked_add_days(Days::new(u64::from(count))),
        FrequencyUnit::Week => from.checked_add_days(Days::new(u64::from(count) * 7)),
        FrequencyUnit::Month => add_months_overflowing(from, i64::from(count)),
        FrequencyUnit::Year => add_months_overflowing(from, i64::from(count) * 12),
    }
}

/// Target `(year, month)` after adding `months` to `from`'s month.
fn shifted_month(from: NaiveDate, months: i64) -> Option<(i32, u32)> {
    let index = i64::from(from.year()) * 12 + i64::from(from.month0()) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month0 = u32::try_from(index.rem_euclid(12)).ok()?;
    Some((year, month0 + 1))
}

fn add_months_overflowing(from: NaiveDate, months: i64) -> Option<NaiveDate> {
    let (year, month) = shifted_month(from, months)?;
    // Day N of a short month spills into the next one, e.g. Apr 31 -> May 1.
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(from.day0())))
}

fn add_months_clamped(from: NaiveDate, months: u32) -> Option<NaiveDate> {
    let (year, month) = shifted_month(from, i64::from(months))?;
    let day = from.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = first.checked_add_months(chrono::Months::new(1))?;
    u32::try_from(next_first.signed_duration_since(first).num_days()).ok()
}
