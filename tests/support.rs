//! Shared fixtures for the integration tests: a manual clock, an
//! in-memory store, and recording collaborator doubles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use weekfocus::{
    BoundaryScheduler, Clock, FocusTracker, ManualClock, MemoryKvStore, Notifier, ScoreBoard,
    Store, TaskProgress, TimerConfig, TimerController,
};

/// Task provider that records every call the engine makes.
#[derive(Default)]
pub struct RecordingTaskProgress {
    completion: Mutex<u8>,
    clear_calls: Mutex<u32>,
    pomodoro_increments: Mutex<u32>,
}

impl RecordingTaskProgress {
    pub fn with_completion(completion: u8) -> Self {
        Self {
            completion: Mutex::new(completion),
            ..Self::default()
        }
    }

    pub fn cleared(&self) -> u32 {
        *self.clear_calls.lock().unwrap()
    }

    pub fn increments(&self) -> u32 {
        *self.pomodoro_increments.lock().unwrap()
    }
}

impl TaskProgress for RecordingTaskProgress {
    fn overall_completion_percentage(&self) -> Result<u8> {
        Ok(*self.completion.lock().unwrap())
    }

    fn clear_all_completion_flags(&self) -> Result<()> {
        *self.clear_calls.lock().unwrap() += 1;
        Ok(())
    }

    fn increment_current_task_pomodoro_count(&self) -> Result<()> {
        *self.pomodoro_increments.lock().unwrap() += 1;
        Ok(())
    }
}

/// Provider whose every call fails, standing in for a task store that has
/// not been initialized when the rollover fires.
pub struct FailingTaskProgress;

impl TaskProgress for FailingTaskProgress {
    fn overall_completion_percentage(&self) -> Result<u8> {
        Err(anyhow!("task store not initialized"))
    }

    fn clear_all_completion_flags(&self) -> Result<()> {
        Err(anyhow!("task store not initialized"))
    }

    fn increment_current_task_pomodoro_count(&self) -> Result<()> {
        Err(anyhow!("task store not initialized"))
    }
}

/// Notifier that records the messages it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub struct Harness {
    pub store: Store,
    pub clock: ManualClock,
    pub tasks: Arc<RecordingTaskProgress>,
    pub notifier: Arc<RecordingNotifier>,
    pub focus: FocusTracker,
    pub timer: TimerController,
    pub scores: ScoreBoard,
    pub scheduler: BoundaryScheduler,
}

pub fn manual_clock(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
}

/// Fresh store, clock pinned to the given UTC time.
pub fn harness_at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Harness {
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    build(
        store,
        manual_clock(y, mo, d, h, mi),
        Arc::new(RecordingTaskProgress::default()),
    )
}

/// Wire the engine around a pre-seeded store. The timer runs its reload
/// recovery here, so seed before calling.
pub fn build(store: Store, clock: ManualClock, tasks: Arc<RecordingTaskProgress>) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
    let notifier = Arc::new(RecordingNotifier::default());
    let focus = FocusTracker::new(store.clone(), clock_arc.clone());
    let timer = TimerController::with_config(
        store.clone(),
        clock_arc.clone(),
        tasks.clone(),
        notifier.clone(),
        focus.clone(),
        test_timer_config(),
    );
    let scores = ScoreBoard::new(store.clone(), clock_arc.clone(), tasks.clone(), focus.clone());
    let scheduler = BoundaryScheduler::new(store.clone(), clock_arc, focus.clone(), scores.clone());

    Harness {
        store,
        clock,
        tasks,
        notifier,
        focus,
        timer,
        scores,
        scheduler,
    }
}

/// Zeroed intervals: no background ticker, auto-start applies inline, and
/// tests drive `tick()` by hand against the manual clock.
pub fn test_timer_config() -> TimerConfig {
    TimerConfig {
        tick_interval: Duration::ZERO,
        auto_start_delay: Duration::ZERO,
    }
}
