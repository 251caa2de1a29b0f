//! Virtual-time simulator - a deterministic event loop around one engine
//!
//! Plays the role of the browser: it owns a manual clock, fires the engine's
//! deadline exactly on time, ticks the display-refresh loop at a fixed
//! cadence while the engine samples progress, and delivers scheduled
//! signals. When several things are due at the same instant, scheduled
//! signals go first (in scheduling order), then the deadline, then the frame.

use std::time::Duration;

use autoplay_core::{AutoplayResult, Direction, NavigationEvent, Timestamp};
use autoplay_runtime::{AdvanceTrigger, DragTracker, Engine, EngineConfig, NavigationControls, Signal};
use autoplay_time::{Clock, ManualClock};

use crate::recorder::{RecordingSink, RecordingTrigger, SwitchBlock};

/// Simulation configuration
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Engine under test
    pub engine: EngineConfig,
    /// Display-refresh cadence
    pub frame_interval: Duration,
    /// Report the engine's own advances back to it, as the carousel does
    pub echo_advances: bool,
    /// Clock reading when the engine starts
    pub start_at: Timestamp,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            engine: EngineConfig::default(),
            frame_interval: Duration::from_millis(16),
            echo_advances: true,
            start_at: Timestamp::ZERO,
        }
    }
}

impl SimConfig {
    pub fn with_cycle(mut self, cycle: Duration) -> Self {
        self.engine.cycle_duration = cycle;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.engine.direction = direction;
        self
    }
}

/// Something the simulation does to the engine at a set time
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Signal(Signal),
    /// Flip the block predicate, then ask the engine to re-check it
    Block(bool),
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    at: Timestamp,
    seq: u64,
    action: Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Due {
    Action,
    Deadline,
    Frame,
}

/// Deterministic simulation of one carousel
pub struct Simulation {
    clock: ManualClock,
    engine: Engine,
    trigger: RecordingTrigger,
    sink: RecordingSink,
    block: SwitchBlock,
    drag: DragTracker,
    queue: Vec<Scheduled>,
    seq: u64,
    frame_interval: Duration,
    next_frame: Option<Timestamp>,
    echo_advances: bool,
    events: u64,
}

impl Simulation {
    /// Build the engine and start it at `config.start_at`
    pub fn new(config: SimConfig) -> AutoplayResult<Self> {
        let clock = ManualClock::starting_at(config.start_at);
        let trigger = RecordingTrigger::new(clock.clone());
        let sink = RecordingSink::new();
        let block = SwitchBlock::new();

        let recorder: Box<dyn AdvanceTrigger> = Box::new(trigger.clone());
        let idle: Box<dyn AdvanceTrigger> = Box::new(|_: NavigationEvent| {});
        let controls = match config.engine.direction {
            Direction::Forwards => NavigationControls::pair(idle, recorder),
            Direction::Backwards => NavigationControls::pair(recorder, idle),
        };

        let mut engine = Engine::new(config.engine, controls, Box::new(block.clone()))?
            .with_affordance(Box::new(sink.clone()));
        engine.start(clock.now());

        let mut sim = Simulation {
            clock,
            engine,
            trigger,
            sink,
            block,
            drag: DragTracker::new(),
            queue: Vec::new(),
            seq: 0,
            frame_interval: config.frame_interval,
            next_frame: None,
            echo_advances: config.echo_advances,
            events: 0,
        };
        sim.sync_frames();
        Ok(sim)
    }

    /// Create with default settings
    pub fn with_defaults() -> AutoplayResult<Self> {
        Self::new(SimConfig::default())
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    /// Deliver `signal` when the clock reaches `at`
    pub fn schedule(&mut self, at: Timestamp, signal: Signal) {
        self.schedule_action(at, Action::Signal(signal));
    }

    /// Flip the block predicate when the clock reaches `at`
    pub fn schedule_block(&mut self, at: Timestamp, blocked: bool) {
        self.schedule_action(at, Action::Block(blocked));
    }

    pub fn schedule_action(&mut self, at: Timestamp, action: Action) {
        self.seq += 1;
        let entry = Scheduled {
            at,
            seq: self.seq,
            action,
        };
        let index = self
            .queue
            .partition_point(|s| (s.at, s.seq) <= (entry.at, entry.seq));
        self.queue.insert(index, entry);
    }

    /// Run every event due up to and including `until`, then leave the
    /// clock at `until`
    pub fn run_until(&mut self, until: Timestamp) {
        while let Some((at, due)) = self.next_due(until) {
            self.clock.set(at);
            match due {
                Due::Action => {
                    let entry = self.queue.remove(0);
                    self.apply(entry.action);
                }
                Due::Deadline => {
                    self.engine.on_deadline(at);
                }
                Due::Frame => {
                    self.engine.on_frame(at);
                    self.next_frame = Some(at + self.frame_interval);
                }
            }
            self.after_event();
        }
        self.clock.set(until);
    }

    /// Run for `dt` of virtual time
    pub fn advance(&mut self, dt: Duration) {
        let until = self.now() + dt;
        self.run_until(until);
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    fn next_due(&self, until: Timestamp) -> Option<(Timestamp, Due)> {
        [
            (self.queue.first().map(|s| s.at), Due::Action),
            (self.engine.next_deadline(), Due::Deadline),
            (self.next_frame, Due::Frame),
        ]
        .into_iter()
        .filter_map(|(at, due)| at.map(|at| (at, due)))
        .filter(|(at, _)| *at <= until)
        .min()
    }

    // ------------------------------------------------------------------
    // Immediate input
    // ------------------------------------------------------------------

    /// Deliver a signal now
    pub fn signal(&mut self, signal: Signal) {
        self.apply(Action::Signal(signal));
        self.after_event();
    }

    /// Flip the block predicate now and let the engine re-check it
    pub fn set_blocked(&mut self, blocked: bool) {
        self.apply(Action::Block(blocked));
        self.after_event();
    }

    /// A person presses a navigation control
    pub fn click_control(&mut self) {
        self.signal(Signal::Navigation(NavigationEvent::user_activation()));
    }

    /// A person drags the carousel by (`dx`, `dy`) pixels
    ///
    /// Returns whether the gesture counted as navigation.
    pub fn drag(&mut self, dx: f64, dy: f64) -> bool {
        self.drag.press(0.0, 0.0);
        self.drag.motion(dx, dy);
        match self.drag.release() {
            Some(event) => {
                self.signal(Signal::Navigation(event));
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, action: Action) {
        let now = self.now();
        match action {
            Action::Signal(signal) => self.engine.handle(signal, now),
            Action::Block(blocked) => {
                self.block.set(blocked);
                self.engine.recheck_blocked(now);
            }
        }
    }

    fn after_event(&mut self) {
        self.events += 1;
        let now = self.now();
        for event in self.trigger.drain_outbox() {
            if self.echo_advances {
                self.engine.on_navigation(event, now);
            }
        }
        self.sync_frames();
    }

    /// Follow the engine's refresh loop: start ticking when it starts
    /// sampling, stop when it stops
    fn sync_frames(&mut self) {
        if self.engine.wants_frame() {
            if self.next_frame.is_none() {
                self.next_frame = Some(self.now() + self.frame_interval);
            }
        } else {
            self.next_frame = None;
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn trigger(&self) -> &RecordingTrigger {
        &self.trigger
    }

    pub fn sink(&self) -> &RecordingSink {
        &self.sink
    }

    pub fn is_blocked(&self) -> bool {
        self.block.get()
    }

    /// Times of every advance so far
    pub fn advances(&self) -> Vec<Timestamp> {
        self.trigger.times()
    }

    /// Events processed so far
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Whether the reconciliation rule holds right now
    pub fn invariant_holds(&self) -> bool {
        let e = &self.engine;
        let should_run = e.intent().is_playing() && e.is_visible() && !e.is_blocked();
        e.run_state().is_active() == should_run
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("now", &self.now())
            .field("engine", &self.engine)
            .field("queued", &self.queue.len())
            .field("events", &self.events)
            .finish()
    }
}
