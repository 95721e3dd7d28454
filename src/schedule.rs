//! Day/week boundary detection.
//!
//! A single orchestrating check, run once at startup and then on a fixed
//! poll, evaluates its sub-checks in a documented order: weekly rollover
//! first, then the daily reset, then the weekly reset. The rollover reads
//! the weekly counters, so it must observe them before the reset zeroes
//! them for the new week. Every evaluation starts from wall-clock now;
//! missed polls (a suspended process, a backgrounded tab) self-correct on
//! the next one.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::focus::FocusTracker;
use crate::score::ScoreBoard;
use crate::storage::Store;
use crate::week;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

const CHECK_INTERVAL_SECS: u64 = 60;

#[derive(Clone)]
pub struct BoundaryScheduler {
    store: Store,
    clock: Arc<dyn Clock>,
    focus: FocusTracker,
    scores: ScoreBoard,
    cancel: CancellationToken,
}

impl BoundaryScheduler {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        focus: FocusTracker,
        scores: ScoreBoard,
    ) -> Self {
        Self {
            store,
            clock,
            focus,
            scores,
            cancel: CancellationToken::new(),
        }
    }

    /// Run every boundary check once, in order.
    pub fn run_checks(&self) {
        self.scores.check_week_end();

        let now = self.clock.now();

        let today = week::day_key(now);
        if self.store.last_focus_day().as_deref() != Some(today.as_str()) {
            log_info!("day boundary crossed, resetting daily focus minutes");
            self.focus.reset_today();
            self.store.set_last_focus_day(&today);
        }

        if week::is_week_start(now) {
            let week_key = week::week_key(now);
            if self.store.last_focus_week().as_deref() != Some(week_key.as_str()) {
                log_info!("week boundary crossed, resetting weekly focus minutes");
                self.focus.reset_this_week();
                self.store.set_last_focus_week(&week_key);
            }
        }
    }

    /// Spawn the polling loop. The first tick fires immediately.
    pub fn spawn(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(Duration::from_secs(CHECK_INTERVAL_SECS));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => scheduler.run_checks(),
                    _ = cancel.cancelled() => {
                        log_info!("boundary check loop shutting down");
                        break;
                    }
                }
            }
        })
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}
