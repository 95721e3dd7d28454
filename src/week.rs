//! Calendar arithmetic for the app's Saturday-start week.
//!
//! The week number is `ceil((days_since_jan1 + jan1_weekday + 1) / 7)` with
//! Sunday-based weekdays and fractional days, so the boundary always falls
//! on Saturday midnight. All computation is UTC.

use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Week number within `now`'s year, 1-based.
pub fn week_number(now: DateTime<Utc>) -> i32 {
    let jan1 = Utc
        .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let elapsed_days = (now - jan1).num_milliseconds() as f64 / MILLIS_PER_DAY;
    let weekday_offset = f64::from(jan1.weekday().num_days_from_sunday());
    ((elapsed_days + weekday_offset + 1.0) / 7.0).ceil() as i32
}

/// `"{year}-{weekNumber}"`, the identifier used by the rollover cursor and
/// the weekly reset marker.
pub fn week_key(now: DateTime<Utc>) -> String {
    format!("{}-{}", now.year(), week_number(now))
}

/// Calendar date key, `YYYY-MM-DD`.
pub fn day_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// The week starts on Saturday; all of Saturday counts as "new week".
pub fn is_week_start(now: DateTime<Utc>) -> bool {
    now.weekday() == Weekday::Sat
}
