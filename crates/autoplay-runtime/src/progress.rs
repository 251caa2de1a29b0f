//! Progress reporting
//!
//! While the engine is active, each display-refresh tick samples the cycle
//! clock and pushes the completion angle to every affordance sink. The
//! refresh loop is a running flag: stopping it is the cancellation.

use autoplay_core::Intent;
use tracing::trace;

use crate::AffordanceSink;

/// Degrees in a full progress ring
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Display-refresh loop state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameLoop {
    running: bool,
}

impl FrameLoop {
    /// Returns whether the loop was newly started
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    /// Returns whether the loop was running
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Fans the paused flag and progress angle out to the sinks
#[derive(Default)]
pub struct ProgressReporter {
    sinks: Vec<Box<dyn AffordanceSink>>,
    frames: FrameLoop,
    last_degrees: f64,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn AffordanceSink>) {
        self.sinks.push(sink);
    }

    #[inline]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Last angle pushed to the sinks
    #[inline]
    pub fn last_degrees(&self) -> f64 {
        self.last_degrees
    }

    #[inline]
    pub fn is_sampling(&self) -> bool {
        self.frames.is_running()
    }

    pub fn start_sampling(&mut self) -> bool {
        self.frames.start()
    }

    pub fn stop_sampling(&mut self) -> bool {
        self.frames.stop()
    }

    /// Sample a completion fraction on a refresh tick
    ///
    /// Returns the emitted angle, or `None` when the loop is stopped.
    pub fn sample(&mut self, fraction: f64) -> Option<f64> {
        if !self.frames.is_running() {
            return None;
        }
        let degrees = fraction.clamp(0.0, 1.0) * FULL_TURN_DEGREES;
        trace!(degrees, "progress frame");
        self.emit(degrees);
        Some(degrees)
    }

    /// Push a zero angle immediately, regardless of the refresh loop
    pub fn force_zero(&mut self) {
        self.emit(0.0);
    }

    /// Sync every sink to the user's intent
    pub fn show_paused(&mut self, paused: bool) {
        for sink in &mut self.sinks {
            show_intent(&mut **sink, paused);
        }
    }

    fn emit(&mut self, degrees: f64) {
        self.last_degrees = degrees;
        for sink in &mut self.sinks {
            sink.show_progress(degrees);
        }
    }
}

/// Push the paused state and the matching button label to one sink
pub(crate) fn show_intent(sink: &mut dyn AffordanceSink, paused: bool) {
    let intent = if paused { Intent::Paused } else { Intent::Playing };
    sink.show_paused(paused);
    sink.show_action_label(intent.action_label());
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("sinks", &self.sinks.len())
            .field("frames", &self.frames)
            .field("last_degrees", &self.last_degrees)
            .finish()
    }
}
