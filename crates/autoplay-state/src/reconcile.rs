//! Intent/run reconciliation
//!
//! `running = Active` iff `intent = Playing AND visible AND NOT blocked`.
//! The rule is evaluated from scratch after every change to any operand;
//! nothing is inferred incrementally.

use autoplay_core::{Intent, RunState};
use tracing::debug;

use crate::{BlockPredicate, Environment, TabPolicy};

/// Snapshot of the three operands of the reconciliation rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inputs {
    pub intent: Intent,
    pub visible: bool,
    pub blocked: bool,
}

impl Inputs {
    #[inline]
    pub fn should_run(&self) -> bool {
        self.intent.is_playing() && self.visible && !self.blocked
    }
}

/// What the timer must do after a reconciliation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Idle -> Active: arm the timer from the remaining duration
    Arm,
    /// Active -> Idle: cancel the timer and snapshot elapsed time
    Disarm,
    /// Already in the right state
    Hold,
}

/// The reconciliation rule as a pure function
pub fn reconcile(inputs: Inputs, running: RunState) -> Transition {
    match (inputs.should_run(), running) {
        (true, RunState::Idle) => Transition::Arm,
        (false, RunState::Active) => Transition::Disarm,
        _ => Transition::Hold,
    }
}

/// Result of a tab visibility change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabChange {
    /// Intent was switched to paused by [`TabPolicy::ForcePause`]
    pub intent_forced: bool,
}

/// Owner of intent, run state and the pushed environmental signals
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    intent: Intent,
    running: RunState,
    env: Environment,
    tab_policy: TabPolicy,
}

impl Reconciler {
    pub fn new(tab_policy: TabPolicy) -> Self {
        Reconciler {
            tab_policy,
            ..Self::default()
        }
    }

    #[inline]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    #[inline]
    pub fn run_state(&self) -> RunState {
        self.running
    }

    #[inline]
    pub fn environment(&self) -> Environment {
        self.env
    }

    #[inline]
    pub fn tab_policy(&self) -> TabPolicy {
        self.tab_policy
    }

    /// Set the user's intent. Returns whether it changed.
    pub fn set_intent(&mut self, intent: Intent) -> bool {
        if self.intent == intent {
            return false;
        }
        debug!(from = %self.intent, to = %intent, "intent changed");
        self.intent = intent;
        true
    }

    /// Record a viewport intersection transition. Intent is untouched.
    pub fn set_visible(&mut self, visible: bool) {
        self.env.visible = visible;
    }

    /// Record a tab visibility transition
    ///
    /// Under [`TabPolicy::ForcePause`] hiding the tab while playing also
    /// pauses the intent. Showing the tab never changes intent.
    pub fn set_tab_hidden(&mut self, hidden: bool) -> TabChange {
        self.env.tab_hidden = hidden;
        let intent_forced = hidden
            && self.tab_policy == TabPolicy::ForcePause
            && self.set_intent(Intent::Paused);
        TabChange { intent_forced }
    }

    /// Read all operands, querying the block predicate fresh
    pub fn inputs(&self, blocker: &dyn BlockPredicate) -> Inputs {
        Inputs {
            intent: self.intent,
            visible: self.env.visible,
            blocked: self.env.tab_hidden || blocker.is_blocked(),
        }
    }

    /// Re-evaluate the rule and commit the resulting run state
    pub fn evaluate(&mut self, blocker: &dyn BlockPredicate) -> Transition {
        let inputs = self.inputs(blocker);
        let transition = reconcile(inputs, self.running);
        match transition {
            Transition::Arm => self.running = RunState::Active,
            Transition::Disarm => self.running = RunState::Idle,
            Transition::Hold => {}
        }
        if transition != Transition::Hold {
            debug!(?inputs, running = %self.running, "run state changed");
        }
        transition
    }

    /// Drop to idle without consulting the rule
    ///
    /// Used by the manual-navigation reset, which must stop the current
    /// cycle before re-evaluating so a playing engine starts a fresh one.
    /// Returns whether the run state was active.
    pub fn halt(&mut self) -> bool {
        let was_active = self.running.is_active();
        self.running = RunState::Idle;
        was_active
    }
}
