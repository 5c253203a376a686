//! Calendar date helpers.
//!
//! Grading works on whole days. Callers convert their clock reading with
//! [`local_today`] or [`to_calendar_date`] and pass the date in.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

/// Today's date on the local clock, i.e. local midnight.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Calendar date of an instant in its own time zone.
pub fn to_calendar_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Whole days from `from` to `to`; negative if `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// `date` plus `days`, saturating at the last representable date.
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}
