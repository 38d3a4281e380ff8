//! Time source for the engine.

use std::sync::RwLock;

use chrono::{Duration, Utc};
use roadmap_core::Time;

/// Supplies "now" to engine operations.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Time;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used by tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<Time>,
}

impl FixedClock {
    /// Create a clock stopped at `now`.
    pub fn new(now: Time) -> Self {
        Self { now: RwLock::new(now) }
    }

    /// Jump to a given time.
    pub fn set(&self, now: Time) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Time {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
