use chrono::{Days, NaiveDate};
use pmtrack_core::{days_diff, format_as_key, format_display, parse_date, today};

#[test]
fn every_day_round_trips_through_key_format() {
    let mut date = NaiveDate::from_ymd_opt(1999, 12, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2031, 3, 1).unwrap();
    while date <= end {
        assert_eq!(parse_date(&format_as_key(date)), Some(date), "{date}");
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn days_diff_is_zero_for_today_and_signed_around_it() {
    let now = today();
    let tomorrow = now.checked_add_days(Days::new(1)).unwrap();
    let yesterday = now.checked_sub_days(Days::new(1)).unwrap();

    assert_eq!(days_diff(&format_as_key(now)), Some(0));
    assert_eq!(days_diff(&format_as_key(tomorrow)), Some(1));
    assert_eq!(days_diff(&format_as_key(yesterday)), Some(-1));
}

#[test]
fn malformed_dates_are_not_errors_but_have_no_day_count() {
    assert_eq!(parse_date("2025-13-01"), None);
    assert_eq!(days_diff("31/01/2025"), None);
    assert_eq!(format_display("31/01/2025"), "31/01/2025");
}

#[test]
fn display_format_matches_short_month_style() {
    assert_eq!(format_display("2025-01-05"), "Jan 5, 2025");
    assert_eq!(format_display("2024-02-29"), "Feb 29, 2024");
}
