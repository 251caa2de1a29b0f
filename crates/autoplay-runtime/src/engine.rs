//! Autoplay Engine - one self-pausing, resumable advance loop per carousel
//!
//! Every entry point takes the host's current time and runs to completion.
//! The engine never sleeps: it exposes its pending deadline and whether it
//! wants display-refresh frames, and the host delivers those back.

use std::time::Duration;

use autoplay_core::{
    AutoplayError, AutoplayResult, Direction, EngineId, Intent, NavigationEvent, RunState,
    TimerToken, Timestamp,
};
use autoplay_state::{BlockPredicate, Reconciler, TabPolicy, Transition};
use autoplay_time::{CycleClock, DeadlineTimer, Pending};
use tracing::{debug, info};

use crate::{AdvanceTrigger, AffordanceSink, AutoplayConfig, NavigationControls, ProgressReporter};

/// Engine configuration
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Length of one advance cycle
    pub cycle_duration: Duration,
    /// Which navigation control advances the carousel
    pub direction: Direction,
    /// What hiding the tab does to intent
    pub tab_policy: TabPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cycle_duration: Duration::from_secs(3),
            direction: Direction::Forwards,
            tab_policy: TabPolicy::PreserveIntent,
        }
    }
}

impl From<&AutoplayConfig> for EngineConfig {
    fn from(config: &AutoplayConfig) -> Self {
        EngineConfig {
            cycle_duration: config.cycle_duration,
            direction: config.direction(),
            tab_policy: config.tab_policy,
        }
    }
}

/// Externally delivered input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Play,
    Pause,
    /// The play/pause button
    Toggle,
    /// Viewport intersection changed
    Visibility(bool),
    /// Hosting tab hidden (`true`) or shown
    TabHidden(bool),
    /// Something page-wide may have changed the block predicate
    Recheck,
    Navigation(NavigationEvent),
}

/// Engine counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub advances: u64,
    pub arms: u64,
    pub disarms: u64,
    pub manual_resets: u64,
    pub frames: u64,
}

/// Autoplay engine for a single carousel
pub struct Engine {
    id: EngineId,
    config: EngineConfig,
    /// Intent, run state and pushed environment
    reconciler: Reconciler,
    /// Cycle origin and elapsed-on-pause bookkeeping
    cycle: CycleClock,
    /// Pending end-of-cycle deadline
    timer: DeadlineTimer,
    progress: ProgressReporter,
    trigger: Box<dyn AdvanceTrigger>,
    blocker: Box<dyn BlockPredicate>,
    started: bool,
    stats: EngineStats,
}

impl Engine {
    /// Build an engine from its navigation controls
    ///
    /// Fails if there are no controls at all, if the control selected by
    /// the direction is missing, or if the cycle duration is zero.
    pub fn new(
        config: EngineConfig,
        mut controls: NavigationControls,
        blocker: Box<dyn BlockPredicate>,
    ) -> AutoplayResult<Self> {
        if config.cycle_duration.is_zero() {
            return Err(AutoplayError::InvalidDuration("zero".into()));
        }
        if controls.is_empty() {
            return Err(AutoplayError::NoNavigationControls);
        }
        let index = config.direction.control_index();
        let trigger = controls.take(index).ok_or(AutoplayError::MissingControl {
            direction: config.direction,
            index,
        })?;

        Ok(Engine {
            id: EngineId::next(),
            reconciler: Reconciler::new(config.tab_policy),
            cycle: CycleClock::new(config.cycle_duration),
            timer: DeadlineTimer::new(),
            progress: ProgressReporter::new(),
            trigger,
            blocker,
            started: false,
            stats: EngineStats::default(),
            config,
        })
    }

    /// Attach an affordance sink
    pub fn with_affordance(mut self, sink: Box<dyn AffordanceSink>) -> Self {
        self.add_affordance(sink);
        self
    }

    /// Attach an affordance sink, syncing it to the current intent
    pub fn add_affordance(&mut self, mut sink: Box<dyn AffordanceSink>) {
        crate::progress::show_intent(&mut *sink, self.is_paused());
        sink.show_progress(self.progress.last_degrees());
        self.progress.add_sink(sink);
    }

    /// Initial kick-off: sync the affordances and reconcile once
    ///
    /// Later calls do nothing.
    pub fn start(&mut self, now: Timestamp) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            engine = %self.id,
            cycle_ms = self.config.cycle_duration.as_millis() as u64,
            direction = %self.config.direction,
            "autoplay engine started"
        );
        self.progress.show_paused(self.is_paused());
        self.reconcile(now);
    }

    // ------------------------------------------------------------------
    // Intent
    // ------------------------------------------------------------------

    pub fn play(&mut self, now: Timestamp) {
        self.set_intent(Intent::Playing, now);
    }

    pub fn pause(&mut self, now: Timestamp) {
        self.set_intent(Intent::Paused, now);
    }

    /// Flip intent, as the play/pause button does
    pub fn toggle(&mut self, now: Timestamp) {
        self.set_intent(self.reconciler.intent().toggled(), now);
    }

    /// Set the user's intent
    ///
    /// Setting the current intent again has no effect at all. Otherwise the
    /// affordances follow the new intent whether or not the run state moves.
    pub fn set_intent(&mut self, intent: Intent, now: Timestamp) {
        if !self.reconciler.set_intent(intent) {
            return;
        }
        self.progress.show_paused(intent.is_paused());
        self.reconcile(now);
    }

    // ------------------------------------------------------------------
    // Environment
    // ------------------------------------------------------------------

    /// Viewport intersection changed. Never touches intent.
    pub fn set_visible(&mut self, visible: bool, now: Timestamp) {
        self.reconciler.set_visible(visible);
        self.reconcile(now);
    }

    /// Tab visibility changed
    pub fn set_tab_hidden(&mut self, hidden: bool, now: Timestamp) {
        let change = self.reconciler.set_tab_hidden(hidden);
        if change.intent_forced {
            self.progress.show_paused(true);
        }
        self.reconcile(now);
    }

    /// Re-query the block predicate
    pub fn recheck_blocked(&mut self, now: Timestamp) {
        self.reconcile(now);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// A navigation of the carousel was observed
    ///
    /// The engine's own advances are ignored. A person's navigation drops
    /// all cycle progress; a playing engine then starts a full fresh cycle
    /// and a paused one stays paused.
    pub fn on_navigation(&mut self, event: NavigationEvent, now: Timestamp) {
        if !event.is_user() {
            return;
        }
        self.stats.manual_resets += 1;
        debug!(engine = %self.id, kind = ?event.kind, "manual navigation, cycle reset");

        if self.reconciler.halt() {
            self.progress.stop_sampling();
        }
        self.timer.cancel();
        self.cycle.reset();
        self.progress.force_zero();
        self.reconcile(now);
    }

    // ------------------------------------------------------------------
    // Timer and frames
    // ------------------------------------------------------------------

    /// Pending deadline, for hosts that schedule by token
    #[inline]
    pub fn pending_deadline(&self) -> Option<Pending> {
        self.timer.pending()
    }

    #[inline]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timer.deadline()
    }

    /// Whether the display-refresh loop is running
    #[inline]
    pub fn wants_frame(&self) -> bool {
        self.progress.is_sampling()
    }

    /// Fire the pending deadline if it is due. Returns whether it fired.
    pub fn on_deadline(&mut self, now: Timestamp) -> bool {
        match self.timer.take_due(now) {
            Some(fired) => {
                self.complete_cycle(fired, now);
                true
            }
            None => false,
        }
    }

    /// Fire a specific deadline; stale tokens are ignored
    pub fn on_timer(&mut self, token: TimerToken, now: Timestamp) -> bool {
        match self.timer.fire(token, now) {
            Some(fired) => {
                self.complete_cycle(fired, now);
                true
            }
            None => false,
        }
    }

    /// Display-refresh tick. Returns the emitted angle, if any.
    pub fn on_frame(&mut self, now: Timestamp) -> Option<f64> {
        if !self.reconciler.run_state().is_active() {
            self.progress.stop_sampling();
            return None;
        }
        let degrees = self.progress.sample(self.cycle.fraction(now))?;
        self.stats.frames += 1;
        Some(degrees)
    }

    /// Dispatch an external signal
    pub fn handle(&mut self, signal: Signal, now: Timestamp) {
        match signal {
            Signal::Play => self.play(now),
            Signal::Pause => self.pause(now),
            Signal::Toggle => self.toggle(now),
            Signal::Visibility(visible) => self.set_visible(visible, now),
            Signal::TabHidden(hidden) => self.set_tab_hidden(hidden, now),
            Signal::Recheck => self.recheck_blocked(now),
            Signal::Navigation(event) => self.on_navigation(event, now),
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[inline]
    pub fn id(&self) -> EngineId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn intent(&self) -> Intent {
        self.reconciler.intent()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.reconciler.intent().is_paused()
    }

    #[inline]
    pub fn run_state(&self) -> RunState {
        self.reconciler.run_state()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.reconciler.environment().visible
    }

    /// Evaluate the block predicate now
    pub fn is_blocked(&self) -> bool {
        self.reconciler.inputs(self.blocker.as_ref()).blocked
    }

    #[inline]
    pub fn elapsed_on_pause(&self) -> Duration {
        self.cycle.elapsed_on_pause()
    }

    #[inline]
    pub fn cycle_started_at(&self) -> Option<Timestamp> {
        self.cycle.started_at()
    }

    /// Cycle time consumed at `now`
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        self.cycle.elapsed(now)
    }

    #[inline]
    pub fn progress_degrees(&self) -> f64 {
        self.progress.last_degrees()
    }

    #[inline]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Apply the reconciliation rule and act on its transition
    fn reconcile(&mut self, now: Timestamp) {
        match self.reconciler.evaluate(self.blocker.as_ref()) {
            Transition::Arm => self.arm(now),
            Transition::Disarm => self.disarm(now),
            Transition::Hold => {}
        }
    }

    fn arm(&mut self, now: Timestamp) {
        let remaining = self.cycle.arm(now);
        let token = self.timer.arm(now + remaining);
        self.progress.start_sampling();
        self.stats.arms += 1;
        debug!(
            engine = %self.id,
            remaining_ms = remaining.as_millis() as u64,
            ?token,
            "cycle armed"
        );
    }

    fn disarm(&mut self, now: Timestamp) {
        self.timer.cancel();
        let elapsed = self.cycle.disarm(now);
        self.progress.stop_sampling();
        self.stats.disarms += 1;
        debug!(
            engine = %self.id,
            elapsed_ms = elapsed.as_millis() as u64,
            "cycle disarmed"
        );
    }

    /// Advance once, then run the next cycle as Active -> Idle -> Active
    fn complete_cycle(&mut self, fired: Pending, now: Timestamp) {
        self.stats.advances += 1;
        debug!(engine = %self.id, late_us = now.since(fired.at).as_micros() as u64, "advance");
        self.trigger.activate(NavigationEvent::programmatic());

        // Anchor on the scheduled deadline so host latency does not
        // accumulate; a host late by a whole cycle re-anchors on `now`.
        let duration = self.cycle.duration();
        let anchor = if now.since(fired.at) >= duration {
            now
        } else {
            fired.at
        };

        self.reconciler.halt();
        self.cycle.reset();
        match self.reconciler.evaluate(self.blocker.as_ref()) {
            Transition::Arm => {
                let deadline = self.cycle.restart_at(anchor);
                self.timer.arm(deadline);
                self.progress.start_sampling();
                self.stats.arms += 1;
            }
            _ => {
                // The page became blocked during the advance
                self.progress.stop_sampling();
                self.stats.disarms += 1;
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.id)
            .field("intent", &self.reconciler.intent())
            .field("running", &self.reconciler.run_state())
            .field("cycle", &self.cycle)
            .field("timer", &self.timer)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use autoplay_state::NeverBlocked;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Log {
        advances: Arc<Mutex<Vec<NavigationEvent>>>,
        paused: Arc<Mutex<Vec<bool>>>,
        degrees: Arc<Mutex<Vec<f64>>>,
    }

    impl AffordanceSink for Log {
        fn show_paused(&mut self, paused: bool) {
            self.paused.lock().push(paused);
        }

        fn show_progress(&mut self, degrees: f64) {
            self.degrees.lock().push(degrees);
        }
    }

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    fn controls(log: &Log) -> NavigationControls {
        let advances = log.advances.clone();
        NavigationControls::pair(
            Box::new(|_: NavigationEvent| {}),
            Box::new(move |event: NavigationEvent| advances.lock().push(event)),
        )
    }

    fn engine(log: &Log) -> Engine {
        Engine::new(EngineConfig::default(), controls(log), Box::new(NeverBlocked))
            .map(|e| e.with_affordance(Box::new(log.clone())))
            .expect("engine")
    }

    #[test]
    fn test_start_arms_full_cycle() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));

        assert_eq!(e.run_state(), RunState::Active);
        assert_eq!(e.next_deadline(), Some(ms(3000)));
        assert!(e.wants_frame());
        assert_eq!(*log.paused.lock(), vec![false, false]);
    }

    #[test]
    fn test_missing_controls() {
        let err = Engine::new(
            EngineConfig::default(),
            NavigationControls::new(),
            Box::new(NeverBlocked),
        )
        .err();
        assert_eq!(err, Some(AutoplayError::NoNavigationControls));

        let mut only_previous = NavigationControls::new();
        only_previous.push(Box::new(|_: NavigationEvent| {}));
        let err = Engine::new(EngineConfig::default(), only_previous, Box::new(NeverBlocked)).err();
        assert_eq!(
            err,
            Some(AutoplayError::MissingControl {
                direction: Direction::Forwards,
                index: 1
            })
        );
    }

    #[test]
    fn test_backwards_uses_previous_control() {
        let hits = Arc::new(Mutex::new(0u32));
        let counter = hits.clone();
        let mut only_previous = NavigationControls::new();
        only_previous.push(Box::new(move |_: NavigationEvent| *counter.lock() += 1));
        let config = EngineConfig {
            direction: Direction::resolve("prev"),
            ..EngineConfig::default()
        };
        let mut e = Engine::new(config, only_previous, Box::new(NeverBlocked)).expect("engine");
        e.start(ms(0));

        assert!(e.on_deadline(ms(3000)));
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_advance_is_programmatic_and_periodic() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));

        assert!(!e.on_deadline(ms(2999)));
        assert!(e.on_deadline(ms(3000)));
        assert_eq!(e.next_deadline(), Some(ms(6000)));

        // A late delivery does not shift the schedule
        assert!(e.on_deadline(ms(6040)));
        assert_eq!(e.next_deadline(), Some(ms(9000)));

        let advances = log.advances.lock();
        assert_eq!(advances.len(), 2);
        assert!(advances.iter().all(|event| !event.is_user()));
    }

    #[test]
    fn test_very_late_delivery_reanchors() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));

        assert!(e.on_deadline(ms(10_000)));
        assert_eq!(e.next_deadline(), Some(ms(13_000)));
        assert!(!e.on_deadline(ms(10_001)));
    }

    #[test]
    fn test_pause_then_play_resumes() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));

        e.pause(ms(1200));
        assert_eq!(e.run_state(), RunState::Idle);
        assert_eq!(e.elapsed_on_pause(), Duration::from_millis(1200));
        assert_eq!(e.next_deadline(), None);
        assert!(!e.wants_frame());

        e.play(ms(6200));
        assert_eq!(e.next_deadline(), Some(ms(8000)));
        let degrees = e.on_frame(ms(6200)).expect("sampling");
        assert!((degrees - 144.0).abs() < 1e-6);
    }

    #[test]
    fn test_idempotent_intent() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));
        let before = log.paused.lock().len();
        let stats = e.stats().clone();

        e.play(ms(500));
        assert_eq!(log.paused.lock().len(), before);
        assert_eq!(e.stats(), &stats);

        e.pause(ms(600));
        e.pause(ms(700));
        assert_eq!(log.paused.lock().len(), before + 1);
        assert_eq!(e.elapsed_on_pause(), Duration::from_millis(600));
    }

    #[test]
    fn test_ui_follows_intent_even_when_hidden() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));
        e.set_visible(false, ms(100));

        e.pause(ms(200));
        e.toggle(ms(300));
        assert_eq!(*log.paused.lock(), vec![false, false, true, false]);
        assert_eq!(e.run_state(), RunState::Idle);
    }

    #[test]
    fn test_visibility_preserves_intent() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));

        e.set_visible(false, ms(1000));
        assert_eq!(e.intent(), Intent::Playing);
        assert_eq!(e.run_state(), RunState::Idle);

        e.set_visible(true, ms(11_000));
        assert_eq!(e.next_deadline(), Some(ms(13_000)));
    }

    #[test]
    fn test_blocked_mid_cycle() {
        let flag = Arc::new(AtomicBool::new(false));
        let probe = flag.clone();
        let log = Log::default();
        let mut e = Engine::new(
            EngineConfig::default(),
            controls(&log),
            Box::new(move || probe.load(Ordering::SeqCst)),
        )
        .expect("engine");
        e.start(ms(0));

        flag.store(true, Ordering::SeqCst);
        e.recheck_blocked(ms(2000));
        assert_eq!(e.run_state(), RunState::Idle);
        assert!(e.is_blocked());

        flag.store(false, Ordering::SeqCst);
        e.recheck_blocked(ms(4000));
        assert_eq!(e.next_deadline(), Some(ms(5000)));
    }

    #[test]
    fn test_user_navigation_resets() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));
        e.on_frame(ms(1500));

        e.on_navigation(NavigationEvent::user_drag(), ms(2000));
        assert_eq!(e.next_deadline(), Some(ms(5000)));
        assert_eq!(log.degrees.lock().last(), Some(&0.0));
        assert_eq!(e.stats().manual_resets, 1);
    }

    #[test]
    fn test_user_navigation_while_paused_stays_paused() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));
        e.pause(ms(1000));

        e.on_navigation(NavigationEvent::user_activation(), ms(1500));
        assert_eq!(e.run_state(), RunState::Idle);
        assert_eq!(e.elapsed_on_pause(), Duration::ZERO);

        e.play(ms(2000));
        assert_eq!(e.next_deadline(), Some(ms(5000)));
    }

    #[test]
    fn test_programmatic_navigation_ignored() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));

        e.on_navigation(NavigationEvent::programmatic(), ms(1000));
        assert_eq!(e.next_deadline(), Some(ms(3000)));
        assert_eq!(e.stats().manual_resets, 0);
    }

    #[test]
    fn test_stale_timer_token_ignored() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));
        let first = e.pending_deadline().map(|p| p.token).expect("armed");

        e.pause(ms(500));
        e.play(ms(600));
        assert!(!e.on_timer(first, ms(5000)));
        let second = e.pending_deadline().map(|p| p.token).expect("armed");
        assert!(e.on_timer(second, ms(3100)));
        assert_eq!(log.advances.lock().len(), 1);
    }

    #[test]
    fn test_frames_stop_when_idle() {
        let log = Log::default();
        let mut e = engine(&log);
        e.start(ms(0));

        assert_eq!(e.on_frame(ms(750)), Some(90.0));
        e.set_visible(false, ms(800));
        assert_eq!(e.on_frame(ms(900)), None);
        assert_eq!(e.stats().frames, 1);
    }

    #[test]
    fn test_force_pause_tab_policy() {
        let log = Log::default();
        let config = EngineConfig {
            tab_policy: TabPolicy::ForcePause,
            ..EngineConfig::default()
        };
        let mut e = Engine::new(config, controls(&log), Box::new(NeverBlocked))
            .expect("engine")
            .with_affordance(Box::new(log.clone()));
        e.start(ms(0));

        e.set_tab_hidden(true, ms(1000));
        assert!(e.is_paused());
        e.set_tab_hidden(false, ms(2000));
        assert_eq!(e.run_state(), RunState::Idle);
        assert_eq!(log.paused.lock().last(), Some(&true));
    }
}
