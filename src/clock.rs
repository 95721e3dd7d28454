use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Wall-clock source for everything temporal: countdown recovery, minute
/// accounting, and day/week boundary detection all re-derive from `now()`
/// rather than counting ticks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually-advanced clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<Mutex<i64>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(Mutex::new(start.timestamp_millis())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.lock() += by.as_millis() as i64;
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.lock() += secs * 1000;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.lock() = to.timestamp_millis();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, i64> {
        match self.millis.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = *self.lock();
        DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }
}
