//! Meeting-date parsing.
//!
//! The portal renders dates like `"Monday, March 3rd 2025 at 2:00pm"`. Only the
//! day portion (before `" at "`) is ever parsed; the time of day is ignored.
//! A leading weekday name is required by the strict form but never checked
//! against the date it precedes.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Shape of the strict format used when classifying records by day:
/// `<Weekday>, <Month> <Day> <Year>`.
pub const STRICT_FORMAT: &str = "%A, %B %d %Y";

/// [`STRICT_FORMAT`] after its weekday has been split off.
const STRICT_DATE_FORMAT: &str = "%B %d %Y";

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Tolerant formats tried, in order, once any weekday is removed.
const FUZZY_FORMATS: &[&str] = &[
    STRICT_DATE_FORMAT,
    "%B %d, %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Formats without a year; the reference year is appended before parsing.
const YEARLESS_FORMATS: &[&str] = &["%B %d", "%m/%d"];

/// Remove `st`/`nd`/`rd`/`th` following a run of digits (`3rd` -> `3`).
pub fn strip_ordinal_suffixes(text: &str) -> Cow<'_, str> {
    static ORDINAL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(\d+)(st|nd|rd|th)").unwrap());
    ORDINAL_RE.replace_all(text, "$1")
}

/// Drop a leading full or abbreviated weekday name (`"Mon, "`, `"Friday "`).
fn strip_weekday(day: &str) -> &str {
    static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)^(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun)\.?,?\s+",
        )
        .unwrap()
    });
    match WEEKDAY_RE.find(day) {
        Some(weekday) => &day[weekday.end()..],
        None => day,
    }
}

/// The portion of a meeting string before `" at "`, with ordinals stripped.
fn day_portion(meeting: &str) -> Cow<'_, str> {
    let day = meeting.split(" at ").next().unwrap_or(meeting);
    strip_ordinal_suffixes(day.trim())
}

/// Parse the calendar day of a meeting string in the [`STRICT_FORMAT`] shape.
pub fn parse_meeting_day(meeting: &str) -> Option<NaiveDate> {
    let day = day_portion(meeting);
    let (weekday, date) = day.split_once(", ")?;
    if !WEEKDAYS.iter().any(|name| name.eq_ignore_ascii_case(weekday)) {
        return None;
    }
    NaiveDate::parse_from_str(date, STRICT_DATE_FORMAT).ok()
}

/// Best-effort parse of a meeting string into a timestamp at midnight of its day.
///
/// Tries the strict shape first, then tolerant variants without the weekday,
/// and finally yearless forms completed with `reference_year`.
pub fn parse_meeting_timestamp(meeting: &str, reference_year: i32) -> Option<NaiveDateTime> {
    let date = parse_meeting_day(meeting).or_else(|| {
        let day = day_portion(meeting);
        let day = strip_weekday(day.trim()).trim();

        FUZZY_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
            .or_else(|| {
                let with_year = format!("{day} {reference_year}");
                YEARLESS_FORMATS.iter().find_map(|format| {
                    NaiveDate::parse_from_str(&with_year, &format!("{format} %Y")).ok()
                })
            })
    })?;

    date.and_hms_opt(0, 0, 0)
}

/// Convenience for callers holding a run timestamp.
pub fn parse_meeting_timestamp_at(meeting: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    parse_meeting_timestamp(meeting, now.year())
}
