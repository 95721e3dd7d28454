//! Persisted key layout. Every key is namespaced by the application
//! prefix; the dated focus-minute keys accumulate one entry per day/week
//! encountered and are never cleaned up.

pub const PREFIX: &str = "weekfocus";

pub const TIMER_STATE: &str = "weekfocus_timer_state";
pub const POMODORO_SETTINGS: &str = "weekfocus_pomodoro_settings";
pub const POMODORO_COUNT: &str = "weekfocus_pomodoro_count";
pub const FOCUS_MINUTES: &str = "weekfocus_focus_minutes";
pub const LAST_FOCUS_DAY: &str = "weekfocus_last_focus_day";
pub const LAST_FOCUS_WEEK: &str = "weekfocus_last_focus_week";
pub const LAST_CHECKED_WEEK: &str = "weekfocus_last_checked_week";
pub const WEEKLY_SCORES: &str = "weekfocus_weekly_scores";

pub fn focus_minutes_today(day_key: &str) -> String {
    format!("{PREFIX}_focus_minutes_today_{day_key}")
}

pub fn focus_minutes_week(year: i32, week_number: i32) -> String {
    format!("{PREFIX}_focus_minutes_week_{year}_{week_number}")
}
