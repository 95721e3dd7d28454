use std::sync::Arc;

use log::info;
use tokio::task::JoinHandle;

use crate::clock::{Clock, SystemClock};
use crate::focus::FocusTracker;
use crate::notify::Notifier;
use crate::schedule::BoundaryScheduler;
use crate::score::ScoreBoard;
use crate::storage::{KvStore, Store};
use crate::tasks::TaskProgress;
use crate::timer::{TimerConfig, TimerController};

/// The fully wired engine: storage, timer, focus accounting, rollover,
/// and the boundary poll.
pub struct App {
    store: Store,
    timer: TimerController,
    focus: FocusTracker,
    scores: ScoreBoard,
    scheduler: BoundaryScheduler,
    scheduler_handle: JoinHandle<()>,
}

impl App {
    pub async fn new(
        kv: Arc<dyn KvStore>,
        tasks: Arc<dyn TaskProgress>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_clock(
            kv,
            tasks,
            notifier,
            Arc::new(SystemClock),
            TimerConfig::default(),
        )
        .await
    }

    pub async fn with_clock(
        kv: Arc<dyn KvStore>,
        tasks: Arc<dyn TaskProgress>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        timer_config: TimerConfig,
    ) -> Self {
        let store = Store::new(kv);
        let focus = FocusTracker::new(store.clone(), clock.clone());
        let scores = ScoreBoard::new(store.clone(), clock.clone(), tasks.clone(), focus.clone());
        let scheduler =
            BoundaryScheduler::new(store.clone(), clock.clone(), focus.clone(), scores.clone());

        // Reload recovery first: a completion missed while unloaded belongs
        // to the week that is about to be rolled over.
        let timer = TimerController::with_config(
            store.clone(),
            clock,
            tasks,
            notifier,
            focus.clone(),
            timer_config,
        );

        scheduler.run_checks();
        timer.resume().await;
        let scheduler_handle = scheduler.spawn();

        info!("weekfocus engine started");

        Self {
            store,
            timer,
            focus,
            scores,
            scheduler,
            scheduler_handle,
        }
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    pub fn focus(&self) -> &FocusTracker {
        &self.focus
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Re-run the boundary checks immediately; intended to be called on
    /// every view. The 60-second poll covers the idle case.
    pub fn check_boundaries(&self) {
        self.scheduler.run_checks();
    }

    pub async fn shutdown(self) {
        self.scheduler.stop();
        self.timer.shutdown().await;
        self.scheduler_handle.abort();
        info!("weekfocus engine stopped");
    }
}
