use std::{sync::Arc, time::Duration};

use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    clock::Clock, focus::FocusTracker, notify::Notifier, storage::Store, tasks::TaskProgress,
};

use super::state::{Phase, PomodoroSettings, SettingsPatch, TimerState};

const WORK_COMPLETE_MESSAGE: &str = "Pomodoro completed! Take a break";
const BREAK_COMPLETE_MESSAGE: &str = "Break is over! Time to work";

/// Cadence knobs. Defaults match production: a 200 ms countdown tick and a
/// 500 ms grace before auto-started phases begin. Tests zero both and
/// drive [`TimerController::tick`] by hand.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    pub tick_interval: Duration,
    pub auto_start_delay: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            auto_start_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub settings: PomodoroSettings,
}

struct TimerInner {
    state: TimerState,
    settings: PomodoroSettings,
}

/// The countdown state machine: work / short-break / long-break phases,
/// start/pause/reset/skip controls, and end-time reconstruction after a
/// reload or suspension.
#[derive(Clone)]
pub struct TimerController {
    inner: Arc<Mutex<TimerInner>>,
    store: Store,
    clock: Arc<dyn Clock>,
    tasks: Arc<dyn TaskProgress>,
    notifier: Arc<dyn Notifier>,
    focus: FocusTracker,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    config: TimerConfig,
}

impl TimerController {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        tasks: Arc<dyn TaskProgress>,
        notifier: Arc<dyn Notifier>,
        focus: FocusTracker,
    ) -> Self {
        Self::with_config(store, clock, tasks, notifier, focus, TimerConfig::default())
    }

    /// Restores the persisted snapshot, replaying a completion that was
    /// missed while unloaded: the countdown is re-derived from the
    /// scheduled end time, never from the persisted `time_left`.
    pub fn with_config(
        store: Store,
        clock: Arc<dyn Clock>,
        tasks: Arc<dyn TaskProgress>,
        notifier: Arc<dyn Notifier>,
        focus: FocusTracker,
        config: TimerConfig,
    ) -> Self {
        let settings = store.pomodoro_settings();
        let mut state = store.timer_state();
        let now_millis = clock.now_millis();
        let recovery = recover(&mut state, &settings, now_millis);
        if recovery.changed {
            state.last_updated = now_millis;
            store.save_timer_state(&state);
        }

        let controller = Self {
            inner: Arc::new(Mutex::new(TimerInner { state, settings })),
            store,
            clock,
            tasks,
            notifier,
            focus,
            ticker: Arc::new(Mutex::new(None)),
            config,
        };

        if recovery.completed_work {
            info!("work session completed while unloaded; crediting it now");
            controller.record_work_completion();
        }

        controller
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let inner = self.inner.lock().await;
        TimerSnapshot {
            state: inner.state.clone(),
            settings: inner.settings.clone(),
        }
    }

    pub async fn state(&self) -> TimerState {
        self.inner.lock().await.state.clone()
    }

    pub async fn settings(&self) -> PomodoroSettings {
        self.inner.lock().await.settings.clone()
    }

    /// No-op if already running. Schedules the end time from the frozen
    /// `time_left` and starts ticking.
    pub async fn start(&self) {
        let now_millis = self.clock.now_millis();
        {
            let mut inner = self.inner.lock().await;
            if inner.state.is_running {
                return;
            }
            schedule(&mut inner.state, now_millis);
            self.persist(&mut inner.state, now_millis);
        }
        // Fresh anchor so time spent paused is never credited.
        self.focus.mark_idle();
        self.spawn_ticker().await;
    }

    /// No-op if not running. Freezes `time_left` at its last derived value.
    pub async fn pause(&self) {
        let now_millis = self.clock.now_millis();
        {
            let mut inner = self.inner.lock().await;
            if !inner.state.is_running {
                return;
            }
            inner.state.is_running = false;
            inner.state.end_time = None;
            self.persist(&mut inner.state, now_millis);
        }
        self.cancel_ticker().await;
    }

    /// Stop and reload the current phase's configured duration. Does not
    /// touch `completed_pomodoros`.
    pub async fn reset(&self) {
        let now_millis = self.clock.now_millis();
        {
            let mut inner = self.inner.lock().await;
            inner.state.is_running = false;
            inner.state.end_time = None;
            let phase = inner.state.phase;
            inner.state.time_left = inner.settings.duration_secs(phase);
            self.persist(&mut inner.state, now_millis);
        }
        self.cancel_ticker().await;
    }

    /// Jump to the phase natural completion would pick, without crediting
    /// a completed session: skipping work never increments the counters.
    pub async fn skip(&self) {
        let now_millis = self.clock.now_millis();
        {
            let mut inner = self.inner.lock().await;
            inner.state.is_running = false;
            inner.state.end_time = None;
            let next = match inner.state.phase {
                Phase::Work => {
                    TimerState::break_after(inner.state.completed_pomodoros + 1, &inner.settings)
                }
                Phase::ShortBreak | Phase::LongBreak => Phase::Work,
            };
            inner.state.phase = next;
            inner.state.time_left = inner.settings.duration_secs(next);
            self.persist(&mut inner.state, now_millis);
        }
        self.cancel_ticker().await;
    }

    /// Forcible user phase selection: stop, switch, reload the duration.
    pub async fn change_phase(&self, phase: Phase) {
        let now_millis = self.clock.now_millis();
        {
            let mut inner = self.inner.lock().await;
            inner.state.is_running = false;
            inner.state.end_time = None;
            inner.state.phase = phase;
            inner.state.time_left = inner.settings.duration_secs(phase);
            self.persist(&mut inner.state, now_millis);
        }
        self.cancel_ticker().await;
    }

    /// Merge a partial settings update, stop the timer, and re-derive the
    /// current phase's duration from the new values. Other phases pick up
    /// the change when they next become active.
    pub async fn update_settings(&self, patch: SettingsPatch) {
        let now_millis = self.clock.now_millis();
        {
            let mut inner = self.inner.lock().await;
            inner.settings.apply(patch);
            self.store.save_pomodoro_settings(&inner.settings);
            inner.state.is_running = false;
            inner.state.end_time = None;
            let phase = inner.state.phase;
            inner.state.time_left = inner.settings.duration_secs(phase);
            self.persist(&mut inner.state, now_millis);
        }
        self.cancel_ticker().await;
    }

    /// Re-arm the ticker for a snapshot restored as still running.
    pub async fn resume(&self) {
        let running = self.inner.lock().await.state.is_running;
        if running {
            self.focus.mark_idle();
            self.spawn_ticker().await;
        }
    }

    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }

    /// One countdown step: re-derive `time_left` from the scheduled end
    /// time, feed the focus accumulator, persist at the reduced cadence,
    /// and run the completion transition when the countdown hits zero.
    /// Returns false once the timer is no longer running.
    pub async fn tick(&self) -> bool {
        let now_millis = self.clock.now_millis();
        let mut inner = self.inner.lock().await;

        // State may have changed since this tick was scheduled.
        if !inner.state.is_running || inner.state.end_time.is_none() {
            self.focus.mark_idle();
            return false;
        }

        let remaining = inner.state.remaining_at(now_millis);
        inner.state.time_left = remaining;

        if inner.state.phase == Phase::Work {
            self.focus.on_work_tick();
        } else {
            self.focus.mark_idle();
        }

        if remaining == 0 {
            self.complete(&mut inner, now_millis);
            return inner.state.is_running;
        }

        // Persist every ~5 seconds while running; recovery re-derives from
        // the end time, so the coarser cadence costs no accuracy.
        if remaining % 5 == 0 {
            self.persist(&mut inner.state, now_millis);
        }

        true
    }

    fn complete(&self, inner: &mut TimerInner, now_millis: i64) {
        inner.state.is_running = false;
        inner.state.end_time = None;

        if inner.state.phase == Phase::Work {
            self.notifier.notify(WORK_COMPLETE_MESSAGE);
            inner.state.completed_pomodoros += 1;
            self.record_work_completion();

            let next = TimerState::break_after(inner.state.completed_pomodoros, &inner.settings);
            inner.state.phase = next;
            inner.state.time_left = inner.settings.duration_secs(next);
            self.persist(&mut inner.state, now_millis);

            if inner.settings.auto_start_breaks {
                self.auto_start(&mut inner.state, now_millis);
            }
        } else {
            self.notifier.notify(BREAK_COMPLETE_MESSAGE);
            inner.state.phase = Phase::Work;
            inner.state.time_left = inner.settings.duration_secs(Phase::Work);
            self.persist(&mut inner.state, now_millis);

            if inner.settings.auto_start_pomodoros {
                self.auto_start(&mut inner.state, now_millis);
            }
        }
    }

    fn record_work_completion(&self) {
        let count = self.store.pomodoro_count() + 1;
        self.store.save_pomodoro_count(count);
        if let Err(err) = self.tasks.increment_current_task_pomodoro_count() {
            warn!("task pomodoro increment failed: {err:#}");
        }
    }

    fn auto_start(&self, state: &mut TimerState, now_millis: i64) {
        if self.config.auto_start_delay.is_zero() {
            schedule(state, now_millis);
            self.persist(state, now_millis);
            self.focus.mark_idle();
            return;
        }

        let controller = self.clone();
        let delay = self.config.auto_start_delay;
        tokio::spawn(async move {
            time::sleep(delay).await;
            controller.start().await;
        });
    }

    fn persist(&self, state: &mut TimerState, now_millis: i64) {
        state.last_updated = now_millis;
        self.store.save_timer_state(state);
    }

    async fn spawn_ticker(&self) {
        let mut guard = self.ticker.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
        if self.config.tick_interval.is_zero() {
            return;
        }

        let controller = self.clone();
        let tick_interval = self.config.tick_interval;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !controller.tick().await {
                    break;
                }
            }
        });

        *guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

fn schedule(state: &mut TimerState, now_millis: i64) {
    state.end_time = Some(now_millis + i64::from(state.time_left) * 1000);
    state.is_running = true;
}

struct Recovery {
    changed: bool,
    completed_work: bool,
}

/// Reload recovery. A snapshot persisted as running re-derives its
/// remaining time from the scheduled end time; an end time already in the
/// past is a completion that happened while unloaded and is replayed once,
/// leaving the timer parked on the next phase.
fn recover(state: &mut TimerState, settings: &PomodoroSettings, now_millis: i64) -> Recovery {
    if !state.is_running {
        return Recovery {
            changed: false,
            completed_work: false,
        };
    }

    if state.end_time.is_none() {
        // Running without an end time is not a state this engine writes.
        state.is_running = false;
        return Recovery {
            changed: true,
            completed_work: false,
        };
    }

    let remaining = state.remaining_at(now_millis);
    if remaining > 0 {
        state.time_left = remaining;
        return Recovery {
            changed: true,
            completed_work: false,
        };
    }

    state.is_running = false;
    state.end_time = None;
    if state.phase == Phase::Work {
        state.completed_pomodoros += 1;
        let next = TimerState::break_after(state.completed_pomodoros, settings);
        state.phase = next;
        state.time_left = settings.duration_secs(next);
        Recovery {
            changed: true,
            completed_work: true,
        }
    } else {
        state.phase = Phase::Work;
        state.time_left = settings.duration_secs(Phase::Work);
        Recovery {
            changed: true,
            completed_work: false,
        }
    }
}
