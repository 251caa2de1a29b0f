//! Identity types for autoplay engines and their timers

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Engine identity - one per carousel instance on a page
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct EngineId(pub u32);

static NEXT_ENGINE_ID: AtomicU32 = AtomicU32::new(1);

impl EngineId {
    pub const ZERO: EngineId = EngineId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        EngineId(id)
    }

    /// Allocate a fresh, process-unique engine id
    pub fn next() -> Self {
        EngineId(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Engine({})", self.0)
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine-{}", self.0)
    }
}

/// Generation token of an armed deadline
///
/// Each arm issues a new token; a token that is no longer the pending one
/// is stale and must be ignored when it fires.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

impl TimerToken {
    #[inline]
    pub fn next(self) -> Self {
        TimerToken(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer#{}", self.0)
    }
}
