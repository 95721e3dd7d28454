//! Weekly score rollover.
//!
//! Once per week boundary the engine snapshots aggregate progress into an
//! immutable record and resets the live weekly counters. The check is
//! keyed on a persisted cursor, so it is idempotent and safe to run on
//! every view and on every poll.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::focus::FocusTracker;
use crate::storage::Store;
use crate::tasks::TaskProgress;
use crate::week;

/// Immutable snapshot of one finished week. At most one record exists per
/// `(year, weekNumber)`; the id is derived from that pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyScore {
    pub id: String,
    pub week_number: i32,
    pub year: i32,
    pub completion_percentage: u8,
    pub pomodoro_count: u32,
    pub focus_minutes: u32,
    pub end_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ScoreBoard {
    store: Store,
    clock: Arc<dyn Clock>,
    tasks: Arc<dyn TaskProgress>,
    focus: FocusTracker,
}

impl ScoreBoard {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        tasks: Arc<dyn TaskProgress>,
        focus: FocusTracker,
    ) -> Self {
        Self {
            store,
            clock,
            tasks,
            focus,
        }
    }

    /// The historical records, oldest first.
    pub fn weekly_scores(&self) -> Vec<WeeklyScore> {
        self.store.weekly_scores()
    }

    /// The once-per-week rollover. Only the first call after a Saturday
    /// week boundary has any effect; returns the record it created, if any.
    ///
    /// Must run before the weekly counter reset in the same check cycle,
    /// so the snapshot reads the finished week's numbers.
    pub fn check_week_end(&self) -> Option<WeeklyScore> {
        let now = self.clock.now();
        if !week::is_week_start(now) {
            return None;
        }

        let current_week = week::week_key(now);
        if self.store.last_checked_week().as_deref() == Some(current_week.as_str()) {
            return None;
        }

        let year = now.year();
        // Literal subtraction: in the first week of January this names
        // week 0 of the current year. Kept as the source behavior.
        let previous_week = week::week_number(now) - 1;

        let mut created = None;
        let already_recorded = self
            .store
            .weekly_scores()
            .iter()
            .any(|s| s.week_number == previous_week && s.year == year);

        if already_recorded {
            info!("week {year}-{previous_week} already recorded, skipping snapshot");
        } else {
            let completion = match self.tasks.overall_completion_percentage() {
                Ok(value) => value.min(100),
                Err(err) => {
                    warn!("task completion unavailable, recording 0%: {err:#}");
                    0
                }
            };

            let score = WeeklyScore {
                id: format!("{year}-{previous_week}"),
                week_number: previous_week,
                year,
                completion_percentage: completion,
                pomodoro_count: self.store.pomodoro_count(),
                focus_minutes: self.focus.minutes_this_week(),
                end_date: now,
            };
            self.store.add_weekly_score(&score);
            self.store.reset_pomodoro_count();
            self.focus.reset_since_rollover();
            info!(
                "recorded weekly score {}: {}%, {} pomodoros, {} focus minutes",
                score.id, score.completion_percentage, score.pomodoro_count, score.focus_minutes
            );
            created = Some(score);
        }

        if let Err(err) = self.tasks.clear_all_completion_flags() {
            warn!("failed to clear task completion flags: {err:#}");
        }
        self.store.set_last_checked_week(&current_week);

        created
    }
}
