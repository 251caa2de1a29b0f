//! Tokio driver - the event loop for one engine
//!
//! Waits for the earliest of: an incoming signal, the engine's pending
//! deadline, or the next display-refresh frame (only while the engine is
//! sampling progress). Each wake-up locks the engine, delivers exactly one
//! event and releases it, so events never interleave.

use std::time::Duration;

use autoplay_core::{AutoplayError, AutoplayResult, Timestamp};
use autoplay_time::Clock;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::{EngineHandle, Signal};

/// Default display-refresh cadence (~60 Hz)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Clock over tokio's instant, so paused test time applies
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        TokioClock {
            origin: Instant::now(),
        }
    }

    /// The tokio instant corresponding to a timestamp of this clock
    pub fn instant_at(&self, t: Timestamp) -> Instant {
        self.origin + Duration::from_micros(t.as_micros())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.origin.elapsed();
        Timestamp::from_micros(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
    }
}

#[derive(Debug)]
enum Command {
    Signal(Signal),
    Shutdown,
}

/// Sending side of a running driver
#[derive(Clone, Debug)]
pub struct DriverHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl DriverHandle {
    /// Deliver a signal to the engine
    pub fn send(&self, signal: Signal) -> AutoplayResult<()> {
        self.tx
            .send(Command::Signal(signal))
            .map_err(|_| AutoplayError::Driver("driver stopped".into()))
    }

    /// Stop the driver loop. The engine itself stays registered.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Event loop for one engine
pub struct EngineDriver {
    engine: EngineHandle,
    clock: TokioClock,
    frame_interval: Duration,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl EngineDriver {
    /// Create a driver. `clock` must be the clock the engine was started with.
    pub fn new(engine: EngineHandle, clock: TokioClock) -> (Self, DriverHandle) {
        Self::with_frame_interval(engine, clock, DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_frame_interval(
        engine: EngineHandle,
        clock: TokioClock,
        frame_interval: Duration,
    ) -> (Self, DriverHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = EngineDriver {
            engine,
            clock,
            frame_interval,
            rx,
        };
        (driver, DriverHandle { tx })
    }

    /// Run until shut down or every handle is dropped
    pub async fn run(mut self) {
        let mut frames = time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let (pending, wants_frame) = {
                let engine = self.engine.lock();
                (engine.pending_deadline(), engine.wants_frame())
            };
            let wake_at = pending
                .map(|p| self.clock.instant_at(p.at))
                .unwrap_or_else(Instant::now);

            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(Command::Signal(signal)) => {
                        let now = self.clock.now();
                        self.engine.lock().handle(signal, now);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                _ = time::sleep_until(wake_at), if pending.is_some() => {
                    if let Some(p) = pending {
                        let now = self.clock.now();
                        self.engine.lock().on_timer(p.token, now);
                    }
                }
                _ = frames.tick(), if wants_frame => {
                    let now = self.clock.now();
                    self.engine.lock().on_frame(now);
                }
            }
        }

        debug!("autoplay driver stopped");
    }
}
