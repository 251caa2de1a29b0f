//! Recording collaborators
//!
//! Stand-ins for the page: they remember everything the engine did to them
//! so tests can assert on it afterwards. Clones share their records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use autoplay_core::{NavigationEvent, Timestamp};
use autoplay_runtime::{AdvanceTrigger, AffordanceSink};
use autoplay_state::BlockPredicate;
use autoplay_time::{Clock, ManualClock};
use parking_lot::Mutex;

/// One activation of the advance control
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Activation {
    pub at: Timestamp,
    pub event: NavigationEvent,
}

/// Advance control that records when it was activated
#[derive(Clone, Debug)]
pub struct RecordingTrigger {
    clock: ManualClock,
    activations: Arc<Mutex<Vec<Activation>>>,
    /// Activations not yet echoed back to the engine
    outbox: Arc<Mutex<Vec<NavigationEvent>>>,
}

impl RecordingTrigger {
    pub fn new(clock: ManualClock) -> Self {
        RecordingTrigger {
            clock,
            activations: Arc::default(),
            outbox: Arc::default(),
        }
    }

    pub fn activations(&self) -> Vec<Activation> {
        self.activations.lock().clone()
    }

    /// Times of every advance so far
    pub fn times(&self) -> Vec<Timestamp> {
        self.activations.lock().iter().map(|a| a.at).collect()
    }

    pub fn count(&self) -> usize {
        self.activations.lock().len()
    }

    /// Navigation events the page would have reported since the last drain
    pub fn drain_outbox(&self) -> Vec<NavigationEvent> {
        std::mem::take(&mut *self.outbox.lock())
    }
}

impl AdvanceTrigger for RecordingTrigger {
    fn activate(&mut self, event: NavigationEvent) {
        self.activations.lock().push(Activation {
            at: self.clock.now(),
            event,
        });
        self.outbox.lock().push(event);
    }
}

/// Affordance sink that keeps the full history it was shown
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    paused: Arc<Mutex<Vec<bool>>>,
    degrees: Arc<Mutex<Vec<f64>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paused_history(&self) -> Vec<bool> {
        self.paused.lock().clone()
    }

    pub fn degrees_history(&self) -> Vec<f64> {
        self.degrees.lock().clone()
    }

    pub fn last_paused(&self) -> Option<bool> {
        self.paused.lock().last().copied()
    }

    pub fn last_degrees(&self) -> Option<f64> {
        self.degrees.lock().last().copied()
    }
}

impl AffordanceSink for RecordingSink {
    fn show_paused(&mut self, paused: bool) {
        self.paused.lock().push(paused);
    }

    fn show_progress(&mut self, degrees: f64) {
        self.degrees.lock().push(degrees);
    }
}

/// Block predicate that a test can flip
#[derive(Clone, Debug, Default)]
pub struct SwitchBlock {
    blocked: Arc<AtomicBool>,
}

impl SwitchBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn get(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }
}

impl BlockPredicate for SwitchBlock {
    fn is_blocked(&self) -> bool {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_records_time() {
        let clock = ManualClock::new();
        let mut trigger = RecordingTrigger::new(clock.clone());
        let view = trigger.clone();

        clock.advance(Duration::from_millis(3000));
        trigger.activate(NavigationEvent::programmatic());

        assert_eq!(view.times(), vec![Timestamp::from_millis(3000)]);
        assert_eq!(view.drain_outbox().len(), 1);
        assert!(view.drain_outbox().is_empty());
        assert_eq!(view.count(), 1);
    }

    #[test]
    fn test_switch_block() {
        let block = SwitchBlock::new();
        let probe = block.clone();
        assert!(!probe.is_blocked());
        block.set(true);
        assert!(probe.is_blocked());
    }
}
