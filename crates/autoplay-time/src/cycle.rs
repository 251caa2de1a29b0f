//! Resumable cycle clock
//!
//! Tracks when the current advance cycle began and how much of it was
//! already consumed when it was last stopped, so that a paused cycle
//! resumes exactly where it left off.

use std::time::Duration;

use autoplay_core::{fraction_of, Timestamp};

/// Bookkeeping for one fixed-length advance cycle
#[derive(Clone, Debug)]
pub struct CycleClock {
    /// Full cycle length, fixed for the clock's lifetime
    duration: Duration,
    /// Virtual cycle origin, only present while armed
    started_at: Option<Timestamp>,
    /// Portion of the cycle consumed before the last disarm
    /// INVARIANT: never exceeds `duration`
    elapsed_on_pause: Duration,
}

impl CycleClock {
    pub fn new(duration: Duration) -> Self {
        CycleClock {
            duration,
            started_at: None,
            elapsed_on_pause: Duration::ZERO,
        }
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.started_at.is_some()
    }

    #[inline]
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    #[inline]
    pub fn elapsed_on_pause(&self) -> Duration {
        self.elapsed_on_pause
    }

    /// Start or resume the cycle at `now`
    ///
    /// The origin is placed `elapsed_on_pause` in the past so progress keeps
    /// climbing from where it stopped. Returns the time left until the
    /// cycle completes. Arming an armed clock changes nothing.
    pub fn arm(&mut self, now: Timestamp) -> Duration {
        if self.is_armed() {
            return self.remaining(now);
        }

        let consumed = self.elapsed_on_pause.min(self.duration);
        self.elapsed_on_pause = Duration::ZERO;
        self.started_at = Some(now - consumed);
        self.duration - consumed
    }

    /// Begin a fresh full cycle anchored at `origin`
    pub fn restart_at(&mut self, origin: Timestamp) -> Timestamp {
        self.elapsed_on_pause = Duration::ZERO;
        self.started_at = Some(origin);
        origin + self.duration
    }

    /// Stop the cycle and remember how far into it we were
    ///
    /// Returns the recorded elapsed time. Disarming a stopped clock keeps
    /// the previous snapshot.
    pub fn disarm(&mut self, now: Timestamp) -> Duration {
        if let Some(started_at) = self.started_at.take() {
            self.elapsed_on_pause = now.since(started_at).min(self.duration);
        }
        self.elapsed_on_pause
    }

    /// Forget all progress. The clock is left disarmed.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.elapsed_on_pause = Duration::ZERO;
    }

    /// Portion of the cycle consumed at `now`
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        match self.started_at {
            Some(started_at) => now.since(started_at).min(self.duration),
            None => self.elapsed_on_pause,
        }
    }

    /// Time left until the cycle completes at `now`
    #[inline]
    pub fn remaining(&self, now: Timestamp) -> Duration {
        self.duration.saturating_sub(self.elapsed(now))
    }

    /// Completion in `[0, 1]`
    #[inline]
    pub fn fraction(&self, now: Timestamp) -> f64 {
        fraction_of(self.elapsed(now), self.duration)
    }

    /// When the armed cycle completes
    pub fn deadline(&self) -> Option<Timestamp> {
        self.started_at.map(|origin| origin + self.duration)
    }
}
