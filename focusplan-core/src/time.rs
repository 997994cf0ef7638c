//! Time utilities: wall-clock minutes, calendar days, and weekday snapping.
//!
//! The scheduling engine never fails on bad data, so the lenient helpers here
//! degrade instead of erroring: a malformed `HH:MM` becomes midnight and a
//! malformed `YYYY-MM-DD` becomes [`sentinel_date`]. The strict helpers at the
//! bottom return `anyhow::Result` and are meant for callers validating input.

use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The date unparseable inputs degrade to. Earlier than any real task date.
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parse `HH:MM` (or `HH:MM:SS`, seconds ignored) into a minute-of-day.
///
/// Each field is read independently; a field that is not an integer counts as
/// zero, and input without a `:` yields `0`. Values too large for an `i32`
/// minute count also yield `0`.
pub fn to_minutes(text: &str) -> i32 {
    let mut parts = text.split(':');
    let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
        return 0;
    };
    parse_field(h)
        .checked_mul(60)
        .and_then(|mins| mins.checked_add(parse_field(m)))
        .unwrap_or(0)
}

fn parse_field(value: &str) -> i32 {
    value.trim().parse().unwrap_or(0)
}

/// Format a minute-of-day as zero-padded `HH:MM`.
pub fn to_time_string(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Lenient `YYYY-MM-DD` parse; falls back to [`sentinel_date`].
pub fn parse_date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).unwrap_or_else(|_| sentinel_date())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Shift a date by `n` calendar days (negative `n` goes backwards).
pub fn shift_days(date: NaiveDate, n: i64) -> NaiveDate {
    let shifted = if n >= 0 {
        date.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(n.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Advance forward until the date is Monday..=Friday. Weekdays are unchanged.
pub fn snap_to_weekday(date: NaiveDate) -> NaiveDate {
    let mut day = date;
    while is_weekend(day) {
        day = shift_days(day, 1);
    }
    day
}

/// `YYYY-MM-DD` in, `YYYY-MM-DD` out.
pub fn add_days(date: &str, n: i64) -> String {
    format_date(shift_days(parse_date(date), n))
}

/// `YYYY-MM-DD` in, the same or next weekday out.
pub fn next_weekday(date: &str) -> String {
    format_date(snap_to_weekday(parse_date(date)))
}

/// Strict `YYYY-MM-DD` parse for validating caller input.
pub fn parse_day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid date '{text}' (expected YYYY-MM-DD): {e}"))
}

/// Today's calendar date in an IANA timezone like "America/Chicago".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}
