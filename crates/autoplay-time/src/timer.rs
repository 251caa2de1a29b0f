//! One-shot deadline timer
//!
//! The timer is plain data: the host asks for [`DeadlineTimer::deadline`]
//! and delivers the firing back. Cancelling removes the pending deadline,
//! and every arm issues a new [`TimerToken`], so a firing that was already
//! in flight when the timer was cancelled or re-armed is recognised as
//! stale and dropped.

use autoplay_core::{TimerToken, Timestamp};

/// A pending deadline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pending {
    pub token: TimerToken,
    pub at: Timestamp,
}

/// Single pending one-shot deadline
#[derive(Clone, Debug, Default)]
pub struct DeadlineTimer {
    pending: Option<Pending>,
    last_token: TimerToken,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the deadline at `at`, replacing any pending one
    pub fn arm(&mut self, at: Timestamp) -> TimerToken {
        self.last_token = self.last_token.next();
        self.pending = Some(Pending {
            token: self.last_token,
            at,
        });
        self.last_token
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn deadline(&self) -> Option<Timestamp> {
        self.pending.map(|p| p.at)
    }

    #[inline]
    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    /// Take the pending deadline if it is due at `now`
    pub fn take_due(&mut self, now: Timestamp) -> Option<Pending> {
        match self.pending {
            Some(p) if now >= p.at => self.pending.take(),
            _ => None,
        }
    }

    /// Fire a specific deadline
    ///
    /// Stale tokens, cancelled deadlines and early deliveries are ignored.
    pub fn fire(&mut self, token: TimerToken, now: Timestamp) -> Option<Pending> {
        match self.pending {
            Some(p) if p.token == token && now >= p.at => self.pending.take(),
            _ => None,
        }
    }
}
