//! End-to-end Scenario Suite
//!
//! Each scenario drives one simulated carousel through a realistic
//! sequence of page events and checks the advances, the run state and
//! what the play/pause control showed along the way.

use std::time::Duration;

use autoplay_core::{AutoplayResult, Intent, RunState, Timestamp};
use autoplay_runtime::Signal;

use crate::simulator::Simulation;

// ============================================================================
// RESULT
// ============================================================================

/// Outcome of one scenario
#[derive(Clone, Debug)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub advances: Vec<Timestamp>,
    pub failures: Vec<String>,
}

impl ScenarioResult {
    fn new(name: &'static str) -> Self {
        ScenarioResult {
            name,
            advances: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn check(&mut self, ok: bool, what: impl Into<String>) {
        if !ok {
            self.failures.push(what.into());
        }
    }

    fn expect_advances(&mut self, sim: &Simulation, expected_ms: &[u64]) {
        let expected: Vec<Timestamp> = expected_ms.iter().map(|&ms| Timestamp::from_millis(ms)).collect();
        let actual = sim.advances();
        if actual != expected {
            self.failures
                .push(format!("advances {actual:?}, expected {expected:?}"));
        }
        self.advances = actual;
    }
}

fn at(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

// ============================================================================
// SCENARIOS
// ============================================================================

/// Pause 1.2 s into a 3 s cycle, play 5 s later: the advance comes 1.8 s
/// after play and progress picks up where it stopped.
pub fn scenario_pause_resume() -> AutoplayResult<ScenarioResult> {
    let mut result = ScenarioResult::new("pause_resume");
    let mut sim = Simulation::with_defaults()?;

    sim.schedule(at(1200), Signal::Pause);
    sim.schedule(at(6200), Signal::Play);

    sim.run_until(at(6200));
    result.check(
        sim.engine().elapsed_on_pause() == Duration::ZERO,
        "saved progress cleared on re-arm",
    );
    result.check(
        sim.engine().next_deadline() == Some(at(8000)),
        format!("re-armed for {:?}", sim.engine().next_deadline()),
    );
    let frames_before = sim.sink().degrees_history().len();

    sim.run_until(at(8100));
    let degrees = sim.sink().degrees_history();
    match degrees.get(frames_before) {
        Some(&first) => result.check(
            (144.0..150.0).contains(&first),
            format!("first frame after play at {first} degrees"),
        ),
        None => result.check(false, "no frame after play"),
    }
    // Attaching the control syncs it once, starting the engine once more
    result.check(
        sim.sink().paused_history() == vec![false, false, true, false],
        format!("control showed {:?}", sim.sink().paused_history()),
    );
    result.expect_advances(&sim, &[8000]);
    Ok(result)
}

/// Scroll out of view 1 s into the cycle and back 10 s later: 2 s remain
/// and intent stays Playing throughout.
pub fn scenario_out_of_view() -> AutoplayResult<ScenarioResult> {
    let mut result = ScenarioResult::new("out_of_view");
    let mut sim = Simulation::with_defaults()?;

    sim.schedule(at(1000), Signal::Visibility(false));
    sim.schedule(at(11_000), Signal::Visibility(true));

    sim.run_until(at(1000));
    result.check(sim.engine().run_state() == RunState::Idle, "idle while out of view");
    result.check(
        sim.engine().elapsed_on_pause() == Duration::from_millis(1000),
        format!("saved {:?}", sim.engine().elapsed_on_pause()),
    );
    result.check(sim.engine().intent() == Intent::Playing, "intent kept while out of view");

    sim.run_until(at(11_000));
    result.check(
        sim.engine().next_deadline() == Some(at(13_000)),
        format!("re-armed for {:?}", sim.engine().next_deadline()),
    );

    sim.run_until(at(13_500));
    result.check(sim.engine().intent() == Intent::Playing, "intent kept after return");
    result.check(
        !sim.sink().paused_history().contains(&true),
        "control never showed paused",
    );
    result.expect_advances(&sim, &[13_000]);
    Ok(result)
}

/// A drag beyond the threshold restarts the cycle; a click without
/// movement does not.
pub fn scenario_drag_reset() -> AutoplayResult<ScenarioResult> {
    let mut result = ScenarioResult::new("drag_reset");

    let mut dragged = Simulation::with_defaults()?;
    dragged.run_until(at(1000));
    result.check(dragged.drag(6.0, 0.0), "6 px drag counted as navigation");
    result.check(dragged.engine().progress_degrees() == 0.0, "progress zeroed by drag");
    result.check(
        dragged.engine().next_deadline() == Some(at(4000)),
        format!("drag re-armed for {:?}", dragged.engine().next_deadline()),
    );
    dragged.run_until(at(4500));
    result.expect_advances(&dragged, &[4000]);

    let mut clicked = Simulation::with_defaults()?;
    clicked.run_until(at(1000));
    result.check(!clicked.drag(0.0, 0.0), "0 px press ignored");
    clicked.run_until(at(3500));
    result.check(
        clicked.advances() == vec![at(3000)],
        format!("click advances {:?}", clicked.advances()),
    );
    result.check(clicked.engine().stats().manual_resets == 0, "click did not reset");
    Ok(result)
}

/// Blocked mid-cycle: idle regardless of intent and visibility; unblocked:
/// resume from the saved progress.
pub fn scenario_blocked() -> AutoplayResult<ScenarioResult> {
    let mut result = ScenarioResult::new("blocked");
    let mut sim = Simulation::with_defaults()?;

    sim.schedule_block(at(1000), true);
    sim.schedule_block(at(2500), false);

    sim.run_until(at(2000));
    result.check(sim.engine().run_state() == RunState::Idle, "idle while blocked");
    result.check(sim.engine().intent() == Intent::Playing, "intent kept while blocked");

    sim.run_until(at(2500));
    result.check(
        sim.engine().next_deadline() == Some(at(4500)),
        format!("re-armed for {:?}", sim.engine().next_deadline()),
    );
    sim.run_until(at(5000));
    result.expect_advances(&sim, &[4500]);
    Ok(result)
}

/// Uninterrupted play advances every cycle, exactly on time
pub fn scenario_continuous_cadence(cycles: u64) -> AutoplayResult<ScenarioResult> {
    let mut result = ScenarioResult::new("continuous_cadence");
    let mut sim = Simulation::with_defaults()?;

    sim.run_until(at(cycles * 3000 + 100));
    let expected: Vec<u64> = (1..=cycles).map(|k| k * 3000).collect();
    result.expect_advances(&sim, &expected);
    result.check(sim.engine().stats().manual_resets == 0, "own advances never reset");
    Ok(result)
}

/// Run every scenario
pub fn run_all() -> AutoplayResult<Vec<ScenarioResult>> {
    Ok(vec![
        scenario_pause_resume()?,
        scenario_out_of_view()?,
        scenario_drag_reset()?,
        scenario_blocked()?,
        scenario_continuous_cadence(20)?,
    ])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimConfig;
    use autoplay_core::NavigationEvent;

    fn assert_passed(result: ScenarioResult) {
        assert!(result.passed(), "{}: {:#?}", result.name, result.failures);
    }

    #[test]
    fn test_scenario_pause_resume() {
        assert_passed(scenario_pause_resume().expect("sim"));
    }

    #[test]
    fn test_scenario_out_of_view() {
        assert_passed(scenario_out_of_view().expect("sim"));
    }

    #[test]
    fn test_scenario_drag_reset() {
        assert_passed(scenario_drag_reset().expect("sim"));
    }

    #[test]
    fn test_scenario_blocked() {
        assert_passed(scenario_blocked().expect("sim"));
    }

    #[test]
    fn test_scenario_continuous_cadence() {
        assert_passed(scenario_continuous_cadence(50).expect("sim"));
    }

    #[test]
    fn test_run_all() {
        let results = run_all().expect("sim");
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(ScenarioResult::passed));
    }

    #[test]
    fn test_blocked_while_paused_stays_idle() {
        let mut sim = Simulation::with_defaults().expect("sim");
        sim.run_until(at(1000));
        sim.set_blocked(true);
        sim.signal(Signal::Pause);
        sim.advance_ms(1000);
        sim.set_blocked(false);
        sim.advance_ms(5000);

        assert_eq!(sim.engine().run_state(), RunState::Idle);
        assert!(sim.advances().is_empty());
        assert_eq!(sim.engine().elapsed_on_pause(), Duration::from_millis(1000));
    }

    #[test]
    fn test_user_activation_restarts_full_cycle() {
        let mut sim = Simulation::with_defaults().expect("sim");
        sim.run_until(at(2500));
        sim.click_control();
        sim.run_until(at(6000));

        assert_eq!(sim.advances(), vec![at(5500)]);
        assert_eq!(sim.engine().stats().manual_resets, 1);
    }

    #[test]
    fn test_user_navigation_while_paused_clears_progress() {
        let mut sim = Simulation::with_defaults().expect("sim");
        sim.run_until(at(1000));
        sim.signal(Signal::Pause);
        sim.click_control();
        assert_eq!(sim.engine().elapsed_on_pause(), Duration::ZERO);
        assert_eq!(sim.sink().last_degrees(), Some(0.0));

        sim.advance_ms(500);
        sim.signal(Signal::Play);
        assert_eq!(sim.engine().next_deadline(), Some(at(4500)));
    }

    #[test]
    fn test_programmatic_navigation_never_resets() {
        let mut sim = Simulation::with_defaults().expect("sim");
        sim.run_until(at(1000));
        sim.signal(Signal::Navigation(NavigationEvent::programmatic()));
        sim.run_until(at(3100));

        assert_eq!(sim.advances(), vec![at(3000)]);
        assert_eq!(sim.engine().stats().manual_resets, 0);
    }

    #[test]
    fn test_play_pause_idempotent() {
        let mut sim = Simulation::with_defaults().expect("sim");
        sim.run_until(at(500));
        let stats = sim.engine().stats().clone();
        let shown = sim.sink().paused_history();

        sim.signal(Signal::Play);
        assert_eq!(sim.engine().stats(), &stats);
        assert_eq!(sim.sink().paused_history(), shown);
        assert_eq!(sim.engine().next_deadline(), Some(at(3000)));

        sim.signal(Signal::Pause);
        let stats = sim.engine().stats().clone();
        let shown = sim.sink().paused_history();
        sim.signal(Signal::Pause);
        assert_eq!(sim.engine().stats(), &stats);
        assert_eq!(sim.sink().paused_history(), shown);
    }

    #[test]
    fn test_repeated_interruptions_add_up() {
        let mut sim = Simulation::with_defaults().expect("sim");
        // 3 x 800 ms of play separated by pauses, then 600 ms more
        for _ in 0..3 {
            sim.advance_ms(800);
            sim.signal(Signal::Pause);
            sim.advance_ms(2000);
            sim.signal(Signal::Play);
        }
        let resumed_at = sim.now();
        sim.advance_ms(700);

        assert_eq!(sim.advances(), vec![resumed_at + Duration::from_millis(600)]);
    }

    #[test]
    fn test_tab_hidden_preserves_intent() {
        let mut sim = Simulation::with_defaults().expect("sim");
        sim.run_until(at(1000));
        sim.signal(Signal::TabHidden(true));
        assert_eq!(sim.engine().run_state(), RunState::Idle);
        assert_eq!(sim.engine().intent(), Intent::Playing);

        sim.advance_ms(4000);
        sim.signal(Signal::TabHidden(false));
        assert_eq!(sim.engine().next_deadline(), Some(at(7000)));
    }

    #[test]
    fn test_tab_hidden_force_pause() {
        let mut config = SimConfig::default();
        config.engine.tab_policy = autoplay_state::TabPolicy::ForcePause;
        let mut sim = Simulation::new(config).expect("sim");
        sim.run_until(at(1000));
        sim.signal(Signal::TabHidden(true));
        sim.advance_ms(4000);
        sim.signal(Signal::TabHidden(false));

        assert_eq!(sim.engine().intent(), Intent::Paused);
        assert_eq!(sim.engine().run_state(), RunState::Idle);
        assert_eq!(sim.sink().last_paused(), Some(true));

        sim.signal(Signal::Play);
        assert_eq!(sim.engine().next_deadline(), Some(at(7000)));
    }

    #[test]
    fn test_short_cycle_cadence() {
        let config = SimConfig::default().with_cycle(Duration::from_millis(250));
        let mut sim = Simulation::new(config).expect("sim");
        sim.run_until(at(1000));
        assert_eq!(sim.advances(), vec![at(250), at(500), at(750), at(1000)]);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_resume_fires_after_remaining(pause_ms in 1u64..3000, gap_ms in 0u64..20_000) {
                let mut sim = Simulation::with_defaults().expect("sim");
                sim.run_until(at(pause_ms));
                sim.signal(Signal::Pause);
                sim.advance_ms(gap_ms);
                sim.signal(Signal::Play);
                let resumed_at = sim.now();
                sim.advance_ms(3000);

                let expected = resumed_at + Duration::from_millis(3000 - pause_ms);
                prop_assert_eq!(sim.advances().first().copied(), Some(expected));
            }

            #[test]
            fn prop_drag_threshold(dx in -20.0f64..20.0, dy in -20.0f64..20.0) {
                let mut sim = Simulation::with_defaults().expect("sim");
                sim.run_until(at(1000));
                let counted = sim.drag(dx, dy);
                prop_assert_eq!(counted, dx.abs() > 5.0 || dy.abs() > 5.0);
                prop_assert_eq!(sim.engine().stats().manual_resets, u64::from(counted));
            }
        }
    }
}
