//! Key-value persistence.
//!
//! The engine's only durable resource is a string-keyed store with the
//! shape of browser local storage: synchronous `get`/`set`, last write
//! wins, no transactions. [`Store`] layers one typed accessor pair per
//! persisted key on top of any [`KvStore`] backend; malformed or missing
//! values fall back to documented defaults and are logged, never raised.

pub mod keys;
mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use std::sync::Arc;

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::score::WeeklyScore;
use crate::timer::{PomodoroSettings, TimerState};

/// Synchronous string key-value storage.
///
/// Implementations must not panic; a failed read surfaces as `None` and a
/// failed write is logged and dropped.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Typed facade over a [`KvStore`]. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn KvStore>,
}

impl Store {
    pub fn new(inner: Arc<dyn KvStore>) -> Self {
        Self { inner }
    }

    pub fn timer_state(&self) -> TimerState {
        self.get_json(keys::TIMER_STATE)
    }

    pub fn save_timer_state(&self, state: &TimerState) {
        self.set_json(keys::TIMER_STATE, state);
    }

    pub fn pomodoro_settings(&self) -> PomodoroSettings {
        self.get_json(keys::POMODORO_SETTINGS)
    }

    pub fn save_pomodoro_settings(&self, settings: &PomodoroSettings) {
        self.set_json(keys::POMODORO_SETTINGS, settings);
    }

    /// Completed work sessions since the last weekly rollover.
    pub fn pomodoro_count(&self) -> u32 {
        self.get_counter(keys::POMODORO_COUNT)
    }

    pub fn save_pomodoro_count(&self, count: u32) {
        self.set_counter(keys::POMODORO_COUNT, count);
    }

    pub fn reset_pomodoro_count(&self) {
        self.set_counter(keys::POMODORO_COUNT, 0);
    }

    /// Focus minutes accumulated since the last weekly rollover.
    pub fn focus_minutes(&self) -> u32 {
        self.get_counter(keys::FOCUS_MINUTES)
    }

    pub fn save_focus_minutes(&self, minutes: u32) {
        self.set_counter(keys::FOCUS_MINUTES, minutes);
    }

    pub fn focus_minutes_today(&self, day_key: &str) -> u32 {
        self.get_counter(&keys::focus_minutes_today(day_key))
    }

    pub fn save_focus_minutes_today(&self, day_key: &str, minutes: u32) {
        self.set_counter(&keys::focus_minutes_today(day_key), minutes);
    }

    pub fn focus_minutes_week(&self, year: i32, week_number: i32) -> u32 {
        self.get_counter(&keys::focus_minutes_week(year, week_number))
    }

    pub fn save_focus_minutes_week(&self, year: i32, week_number: i32, minutes: u32) {
        self.set_counter(&keys::focus_minutes_week(year, week_number), minutes);
    }

    pub fn last_focus_day(&self) -> Option<String> {
        self.inner.get(keys::LAST_FOCUS_DAY)
    }

    pub fn set_last_focus_day(&self, day_key: &str) {
        self.inner.set(keys::LAST_FOCUS_DAY, day_key);
    }

    pub fn last_focus_week(&self) -> Option<String> {
        self.inner.get(keys::LAST_FOCUS_WEEK)
    }

    pub fn set_last_focus_week(&self, week_key: &str) {
        self.inner.set(keys::LAST_FOCUS_WEEK, week_key);
    }

    pub fn last_checked_week(&self) -> Option<String> {
        self.inner.get(keys::LAST_CHECKED_WEEK)
    }

    pub fn set_last_checked_week(&self, week_key: &str) {
        self.inner.set(keys::LAST_CHECKED_WEEK, week_key);
    }

    pub fn weekly_scores(&self) -> Vec<WeeklyScore> {
        self.get_json(keys::WEEKLY_SCORES)
    }

    pub fn save_weekly_scores(&self, scores: &[WeeklyScore]) {
        self.set_json(keys::WEEKLY_SCORES, &scores);
    }

    /// Append a score unless one already exists for the same week and year.
    pub fn add_weekly_score(&self, score: &WeeklyScore) {
        let mut scores = self.weekly_scores();
        let exists = scores
            .iter()
            .any(|s| s.week_number == score.week_number && s.year == score.year);
        if !exists {
            scores.push(score.clone());
            self.save_weekly_scores(&scores);
        }
    }

    fn get_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.inner.get(key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("discarding malformed value under {key}: {err}");
                T::default()
            }),
            None => T::default(),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.inner.set(key, &raw),
            Err(err) => error!("failed to encode value for {key}: {err}"),
        }
    }

    fn get_counter(&self, key: &str) -> u32 {
        match self.inner.get(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|err| {
                warn!("discarding malformed counter under {key}: {err}");
                0
            }),
            None => 0,
        }
    }

    fn set_counter(&self, key: &str, value: u32) {
        self.inner.set(key, &value.to_string());
    }
}
