//! Clock implementations for the autoplay engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use autoplay_core::Timestamp;
use parking_lot::Mutex;

/// A source of monotonic [`Timestamp`]s
pub trait Clock: Send + Sync {
    /// Current time. MUST never go backwards.
    fn now(&self) -> Timestamp;
}

/// Monotonic OS clock, measured from its creation
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }

    /// The OS instant corresponding to a timestamp of this clock
    pub fn instant_at(&self, t: Timestamp) -> Instant {
        self.origin + Duration::from_micros(t.as_micros())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.origin.elapsed();
        Timestamp::from_micros(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
    }
}

/// Hand-driven clock for simulation and tests
///
/// Clones share the same time, so a harness can keep one copy and hand
/// another to whatever it is driving.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Timestamp::ZERO)
    }

    pub fn starting_at(t: Timestamp) -> Self {
        ManualClock {
            now: Arc::new(Mutex::new(t)),
        }
    }

    /// Move time forward by `dt`
    pub fn advance(&self, dt: Duration) -> Timestamp {
        let mut now = self.now.lock();
        *now = *now + dt;
        *now
    }

    /// Jump to `t`. Only forward jumps are applied.
    pub fn set(&self, t: Timestamp) -> Timestamp {
        let mut now = self.now.lock();
        if t > *now {
            *now = t;
        }
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
