//! `Clock` implementations.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::traits::Clock;

/// Real time. `sleep` blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    pauses: Vec<Duration>,
}

/// Virtual time for tests and the non-realtime demo.
///
/// `sleep` advances the virtual clock by the requested duration and returns
/// at once. Every pause is recorded. Clones share the same timeline, so a
/// test can keep one handle while the console owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Start the virtual timeline at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState { now: start, pauses: Vec::new() })),
        }
    }

    /// Start the virtual timeline at the current wall time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Move time forward without recording a pause.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.now += chrono::Duration::milliseconds(duration.as_millis() as i64);
    }

    /// Every duration passed to `sleep`, oldest first.
    pub fn pauses(&self) -> Vec<Duration> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).pauses.clone()
    }

    /// Sum of all recorded pauses.
    pub fn total_paused(&self) -> Duration {
        self.pauses().iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.now += chrono::Duration::milliseconds(duration.as_millis() as i64);
        state.pauses.push(duration);
        debug!(millis = duration.as_millis() as u64, "virtual pause");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
