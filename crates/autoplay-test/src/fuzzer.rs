//! Signal Fuzzer - randomized input against the run-state rule
//!
//! Checks, after every event:
//! - the engine runs exactly when intent is Playing, the carousel is
//!   visible and nothing blocks it
//! - a deadline is pending exactly while running, at most one cycle away
//! - saved progress never exceeds one cycle
//!
//! And over the whole run:
//! - no two advances are closer than one cycle

use std::time::Duration;

use autoplay_core::{AutoplayResult, NavigationEvent};
use autoplay_runtime::{EngineConfig, Signal};
use autoplay_state::TabPolicy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulator::{SimConfig, Simulation};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of random inputs
    pub steps: usize,
    /// Longest quiet gap between inputs (milliseconds)
    pub max_gap_ms: u64,
    /// Probability that a navigation input comes from a person
    pub user_nav_prob: f64,
    /// Cycle length of the engine under test
    pub cycle: Duration,
    pub tab_policy: TabPolicy,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            steps: 1000,
            max_gap_ms: 4000,
            user_nav_prob: 0.5,
            cycle: Duration::from_secs(3),
            tab_policy: TabPolicy::PreserveIntent,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            steps: 200,
            ..Self::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            steps: 10_000,
            max_gap_ms: 7000,
            ..Self::default()
        }
    }

    /// Bursts of input much faster than the cycle
    pub fn rapid() -> Self {
        FuzzerConfig {
            steps: 2000,
            max_gap_ms: 50,
            cycle: Duration::from_millis(500),
            ..Self::default()
        }
    }
}

/// Outcome of a fuzzing run
#[derive(Clone, Debug, Default)]
pub struct FuzzReport {
    pub steps: usize,
    pub advances: usize,
    pub manual_resets: u64,
    pub violations: Vec<String>,
}

impl FuzzReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Drives a simulation with random signals
pub struct SignalFuzzer {
    config: FuzzerConfig,
    rng: StdRng,
    sim: Simulation,
    violations: Vec<String>,
}

impl SignalFuzzer {
    pub fn new(config: FuzzerConfig) -> AutoplayResult<Self> {
        let rng = StdRng::seed_from_u64(config.seed);
        let sim = Simulation::new(SimConfig {
            engine: EngineConfig {
                cycle_duration: config.cycle,
                tab_policy: config.tab_policy,
                ..EngineConfig::default()
            },
            ..SimConfig::default()
        })?;

        Ok(SignalFuzzer {
            config,
            rng,
            sim,
            violations: Vec::new(),
        })
    }

    /// Run every step and report
    pub fn run(&mut self) -> FuzzReport {
        self.check("start");
        for step in 0..self.config.steps {
            let gap = self.rng.gen_range(0..=self.config.max_gap_ms);
            self.sim.advance_ms(gap);
            self.check(&format!("step {step} after {gap}ms gap"));

            let input = self.random_input();
            match input {
                Input::Signal(signal) => self.sim.signal(signal),
                Input::Block(blocked) => self.sim.set_blocked(blocked),
            }
            self.check(&format!("step {step} after {input:?}"));
        }
        self.check_spacing();

        FuzzReport {
            steps: self.config.steps,
            advances: self.sim.advances().len(),
            manual_resets: self.sim.engine().stats().manual_resets,
            violations: self.violations.clone(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    fn random_input(&mut self) -> Input {
        match self.rng.gen_range(0..8) {
            0 => Input::Signal(Signal::Play),
            1 => Input::Signal(Signal::Pause),
            2 => Input::Signal(Signal::Toggle),
            3 => Input::Signal(Signal::Visibility(self.rng.gen_bool(0.6))),
            4 => Input::Signal(Signal::TabHidden(self.rng.gen_bool(0.3))),
            5 => Input::Block(self.rng.gen_bool(0.3)),
            6 => {
                let event = if self.rng.gen_bool(self.config.user_nav_prob) {
                    NavigationEvent::user_activation()
                } else {
                    NavigationEvent::programmatic()
                };
                Input::Signal(Signal::Navigation(event))
            }
            _ => Input::Signal(Signal::Recheck),
        }
    }

    fn check(&mut self, context: &str) {
        let now = self.sim.now();
        let engine = self.sim.engine();
        let cycle = self.config.cycle;

        if !self.sim.invariant_holds() {
            self.violations.push(format!(
                "{context}: running={} intent={} visible={} blocked={}",
                engine.run_state(),
                engine.intent(),
                engine.is_visible(),
                engine.is_blocked()
            ));
        }

        let deadline = engine.next_deadline();
        let active = engine.run_state().is_active();
        if active != deadline.is_some() {
            self.violations
                .push(format!("{context}: running={active} but deadline={deadline:?}"));
        }
        if let Some(at) = deadline {
            if at > now + cycle {
                self.violations
                    .push(format!("{context}: deadline {at:?} beyond one cycle from {now:?}"));
            }
        }

        if engine.elapsed_on_pause() > cycle {
            self.violations.push(format!(
                "{context}: saved progress {:?} exceeds cycle",
                engine.elapsed_on_pause()
            ));
        }
    }

    fn check_spacing(&mut self) {
        let advances = self.sim.advances();
        for pair in advances.windows(2) {
            let gap = pair[1] - pair[0];
            if gap < self.config.cycle {
                self.violations
                    .push(format!("advances {:?} and {:?} closer than one cycle", pair[0], pair[1]));
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Input {
    Signal(Signal),
    Block(bool),
}
