//! Focus-minute accounting.
//!
//! Converts elapsed wall-clock time during active work-phase ticking into
//! whole-minute increments, fanned out to three counters with independent
//! reset schedules: since-last-rollover, today, and this week. Partial
//! minutes are carried forward across ticks but dropped at any
//! pause/phase boundary.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Datelike;

use crate::clock::Clock;
use crate::storage::Store;
use crate::week;

/// Shared counter state. Cheap to clone; all clones see the same counters.
#[derive(Clone)]
pub struct FocusTracker {
    inner: Arc<Mutex<FocusState>>,
    store: Store,
    clock: Arc<dyn Clock>,
}

struct FocusState {
    since_rollover: u32,
    today: u32,
    this_week: u32,
    last_tick_millis: i64,
}

impl FocusTracker {
    /// Loads the counters persisted under the current day and week keys.
    /// Values parked under older keys are left behind; every day and week
    /// encountered gets its own key.
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let state = FocusState {
            since_rollover: store.focus_minutes(),
            today: store.focus_minutes_today(&week::day_key(now)),
            this_week: store.focus_minutes_week(now.year(), week::week_number(now)),
            last_tick_millis: now.timestamp_millis(),
        };
        Self {
            inner: Arc::new(Mutex::new(state)),
            store,
            clock,
        }
    }

    pub fn minutes_since_rollover(&self) -> u32 {
        self.lock().since_rollover
    }

    pub fn minutes_today(&self) -> u32 {
        self.lock().today
    }

    pub fn minutes_this_week(&self) -> u32 {
        self.lock().this_week
    }

    /// Re-anchor without accumulating. Called on every tick that is not an
    /// actively-running work tick, and when a work phase starts, so that
    /// idle time is never credited.
    pub fn mark_idle(&self) {
        self.lock().last_tick_millis = self.clock.now_millis();
    }

    /// Credit whole minutes elapsed since the anchor to all three counters,
    /// retaining the sub-minute remainder in the anchor.
    pub fn on_work_tick(&self) {
        let now = self.clock.now();
        let now_millis = now.timestamp_millis();
        let mut state = self.lock();

        let elapsed_secs = (now_millis - state.last_tick_millis) / 1000;
        if elapsed_secs < 0 {
            // Clock moved backward; drop the interval rather than un-credit.
            state.last_tick_millis = now_millis;
            return;
        }

        let whole_minutes = (elapsed_secs / 60) as u32;
        if whole_minutes == 0 {
            return;
        }

        state.since_rollover += whole_minutes;
        state.today += whole_minutes;
        state.this_week += whole_minutes;
        state.last_tick_millis += i64::from(whole_minutes) * 60_000;

        self.store.save_focus_minutes(state.since_rollover);
        self.store
            .save_focus_minutes_today(&week::day_key(now), state.today);
        self.store
            .save_focus_minutes_week(now.year(), week::week_number(now), state.this_week);
    }

    pub fn reset_today(&self) {
        let now = self.clock.now();
        let mut state = self.lock();
        state.today = 0;
        self.store.save_focus_minutes_today(&week::day_key(now), 0);
    }

    pub fn reset_this_week(&self) {
        let now = self.clock.now();
        let mut state = self.lock();
        state.this_week = 0;
        self.store
            .save_focus_minutes_week(now.year(), week::week_number(now), 0);
    }

    /// Zero the since-rollover counter; the weekly rollover calls this
    /// right after snapshotting.
    pub fn reset_since_rollover(&self) {
        let mut state = self.lock();
        state.since_rollover = 0;
        self.store.save_focus_minutes(0);
    }

    fn lock(&self) -> MutexGuard<'_, FocusState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
