//! Per-frame simulation tick
//!
//! The single entry point that advances a run. Sub-steps always run in
//! this order, because each one reads state the previous one wrote:
//! 1. orbit kinematics (ball and rings move)
//! 2. pressure / critical orbit (a critical timeout ends the tick early)
//! 3. escape / chain detection against this tick's ball angle
//! 4. obstacle, ring-time and completion checks
//! 5. focus follower

use super::pressure::PressureStep;
use super::state::{GameState, SimEvent};
use super::{autopilot, chain, focus, kinematics, lifecycle};
use crate::consts::MAX_DT;
use crate::summary::EndCause;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Reverse orbit direction (click/tap/space)
    pub tap: bool,
    /// Abandon the run (mode switch, navigation away)
    pub abandon: bool,
    /// Idle/demo mode - the autopilot taps instead of the player
    pub autopilot: bool,
}

/// Reverse the ball and charge tap pressure; ignored unless running
pub fn tap(state: &mut GameState) {
    if !state.is_running() {
        return;
    }
    kinematics::reverse(state);
    let multiplier = state.pressure.on_tap(state.elapsed, &state.tuning.difficulty);
    state.stats.taps += 1;
    if multiplier > 1.0 {
        log::trace!("Tap spam x{multiplier:.1}, pressure {:.2}", state.pressure.pressure);
    }
}

/// Advance the run by one frame of `dt` seconds (clamped to `MAX_DT`)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.abandon {
        lifecycle::abandon(state);
    }
    if !state.is_running() {
        return;
    }
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };

    if input.tap || (input.autopilot && autopilot::wants_tap(state)) {
        tap(state);
    }

    kinematics::advance(state, dt);

    let decay = state.tuning.orbit.pressure_decay_rate;
    match state.pressure.step(dt, &state.tuning.difficulty, decay) {
        PressureStep::Steady => {}
        PressureStep::EnteredCritical => {
            log::debug!("Critical orbit at pressure {:.2}", state.pressure.pressure);
            state.push_event(SimEvent::CriticalEntered {
                pressure: state.pressure.pressure,
            });
        }
        PressureStep::TimedOut => {
            lifecycle::end_game(state, EndCause::PressureFail);
            return;
        }
    }

    chain::step(state, dt);

    if let Some(cause) = lifecycle::evaluate(state) {
        lifecycle::end_game(state, cause);
        return;
    }

    focus::follow(state, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::sim::state::RunPhase;
    use crate::sim::store::RingStore;
    use crate::tuning::{DifficultyParams, GameMode, Tuning};
    use crate::wrap_angle;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn running(mode: GameMode, tuning: Tuning) -> GameState {
        let mut state = GameState::new(4242, mode, tuning, None);
        lifecycle::start(&mut state);
        state
    }

    /// Freeze ring `index` with its gap at `gap`
    fn pin_ring(state: &mut GameState, index: u32, gap: f32) {
        let GameState { rings, generator, rng, .. } = state;
        let ring = rings.ensure_ring(index, generator, rng);
        ring.gap_center = gap;
        ring.rotation_speed = 0.0;
        ring.drift = 0.0;
        ring.obstacle_offset = None;
    }

    fn run_until_idle_transition(state: &mut GameState) {
        for _ in 0..100 {
            if state.transition.is_none() {
                return;
            }
            tick(state, &TickInput::default(), FRAME_DT);
        }
    }

    #[test]
    fn test_simple_escape() {
        let mut state = running(GameMode::Endless, Tuning::default());
        pin_ring(&mut state, 0, 1.0);
        pin_ring(&mut state, 1, 1.0 + PI);
        state.ball_angle = 1.0;
        assert!((state.current_ring().map(|r| r.gap_width).unwrap_or(0.0) - 0.56).abs() < 1e-6);

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.score, 1);
        assert_eq!(state.chain_multiplier, 2);
        assert_eq!(state.escaped_index, 0);
        assert!(state.transition.is_some());

        run_until_idle_transition(&mut state);
        assert_eq!(state.escaped_index, 1);
        assert_eq!(state.score, 1);
        assert!(state.time_in_ring < 0.2);
    }

    #[test]
    fn test_obstacle_death() {
        let mut state = running(GameMode::Endless, Tuning::default());
        pin_ring(&mut state, 0, 0.0);
        if let Some(ring) = state.rings.get_mut(0) {
            ring.obstacle_offset = Some(PI);
        }
        state.ball_angle = PI;
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.phase, RunPhase::Ended);
        assert_eq!(state.end_cause, Some(EndCause::Obstacle));
    }

    #[test]
    fn test_ring_timeout() {
        let mut state = running(GameMode::Endless, Tuning::default());
        pin_ring(&mut state, 0, 0.0);
        state.ball_angle = PI;
        state.time_in_ring = state.ring_time_budget();
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.end_cause, Some(EndCause::Time));
        let summary = state.summary.clone().expect("summary recorded");
        assert_eq!(summary.cause, EndCause::Time);
        assert_eq!(summary.rings, 0);
    }

    #[test]
    fn test_critical_round_trip() {
        let mut state = running(GameMode::Endless, Tuning::default());
        pin_ring(&mut state, 0, PI);
        pin_ring(&mut state, 1, PI);
        state.ball_angle = 0.0;
        state.pressure.pressure = 1.0;
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert!(state.pressure.is_critical());
        assert_eq!(state.pressure.critical_entries, 1);

        // Bring the gap to the ball and escape
        let ball = state.ball_angle;
        pin_ring(&mut state, 0, ball);
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.score, 1);
        assert!(!state.pressure.is_critical());
        assert_eq!(state.pressure.pressure, 0.0);
        assert_eq!(state.pressure.critical_escapes, 1);
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::CriticalEntered { .. })));
    }

    #[test]
    fn test_critical_timeout_fails_run_on_time() {
        let tuning = Tuning {
            difficulty: DifficultyParams {
                critical_window_seconds: 1.0,
                ..DifficultyParams::standard()
            },
            ..Tuning::default()
        };
        let mut state = running(GameMode::Endless, tuning);
        // Gap just behind the ball; it takes several seconds to come around
        pin_ring(&mut state, 0, wrap_angle(-0.5));
        state.ball_angle = 0.0;
        state.ball_direction = 1.0;
        state.pressure.pressure = 1.0;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert!(state.pressure.is_critical());
        while state.is_running() {
            let before = state.pressure.critical_elapsed;
            tick(&mut state, &TickInput::default(), FRAME_DT);
            if state.is_running() {
                assert!(state.pressure.critical_elapsed < 1.0);
            } else {
                assert!(before + FRAME_DT >= 1.0 - 1e-4);
            }
        }
        assert_eq!(state.end_cause, Some(EndCause::PressureFail));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_critical_timeout_short_circuits_escape() {
        let tuning = Tuning {
            difficulty: DifficultyParams {
                critical_window_seconds: 0.5,
                ..DifficultyParams::standard()
            },
            ..Tuning::default()
        };
        let mut state = running(GameMode::Endless, tuning);
        pin_ring(&mut state, 0, 0.0);
        state.ball_angle = PI;
        state.pressure.pressure = 1.0;
        tick(&mut state, &TickInput::default(), FRAME_DT);
        state.pressure.critical_elapsed = 0.5;
        // Aligned this tick, but the timeout wins
        let ball = state.ball_angle;
        pin_ring(&mut state, 0, ball);
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.end_cause, Some(EndCause::PressureFail));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_sprint_completes_on_escape_tick() {
        let mut state = running(GameMode::Sprint, Tuning::default());
        state.score = 29;
        pin_ring(&mut state, 0, 0.0);
        pin_ring(&mut state, 1, PI);
        state.ball_angle = 0.0;
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.end_cause, Some(EndCause::SprintComplete));
        assert!(state.transition.is_none());
        assert!(state.end_cause.is_some_and(|c| c.is_success()));
    }

    #[test]
    fn test_tap_reverses_and_charges_pressure() {
        let mut state = running(GameMode::Endless, Tuning::default());
        let input = TickInput {
            tap: true,
            ..Default::default()
        };
        tick(&mut state, &input, 0.0);
        assert_eq!(state.ball_direction, -1.0);
        assert!(state.pressure.pressure > 0.0);
        assert_eq!(state.stats.taps, 1);
    }

    #[test]
    fn test_tap_ignored_when_not_running() {
        let mut state = GameState::new(1, GameMode::Endless, Tuning::default(), None);
        tap(&mut state);
        assert_eq!(state.ball_direction, 1.0);
        assert_eq!(state.stats.taps, 0);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = running(GameMode::Endless, Tuning::default());
        pin_ring(&mut state, 0, 0.0);
        state.ball_angle = PI;
        tick(&mut state, &TickInput::default(), 5.0);
        assert!((state.elapsed - MAX_DT).abs() < 1e-6);
        tick(&mut state, &TickInput::default(), f32::NAN);
        assert!((state.elapsed - MAX_DT).abs() < 1e-6);
    }

    #[test]
    fn test_abandon_reports_mode_switch() {
        let mut state = running(GameMode::Daily, Tuning::default());
        let input = TickInput {
            abandon: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT);
        assert_eq!(state.end_cause, Some(EndCause::ModeSwitch));
        // Ended runs no longer tick
        let elapsed = state.elapsed;
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.elapsed, elapsed);
    }

    #[test]
    fn test_determinism() {
        let mut a = running(GameMode::Expert, Tuning::default());
        let mut b = running(GameMode::Expert, Tuning::default());
        for i in 0..600 {
            let input = TickInput {
                tap: i % 37 == 0,
                ..Default::default()
            };
            tick(&mut a, &input, FRAME_DT);
            tick(&mut b, &input, FRAME_DT);
        }
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_autopilot_survives_a_while() {
        let mut state = running(GameMode::Endless, Tuning::default());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..(60 * 20) {
            tick(&mut state, &input, FRAME_DT);
            if !state.is_running() {
                break;
            }
        }
        assert!(state.score >= 3, "autopilot escaped only {} rings", state.score);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_window_and_bounds_hold(
            seed in any::<u64>(),
            taps in proptest::collection::vec(any::<bool>(), 50..600),
        ) {
            let mut state = GameState::new(seed, GameMode::Endless, Tuning::default(), None);
            lifecycle::start(&mut state);
            let mut ended_events = 0;
            for tap in taps {
                let input = TickInput { tap, ..Default::default() };
                tick(&mut state, &input, FRAME_DT);
                prop_assert!((0.0..=1.0).contains(&state.pressure.pressure));
                prop_assert!((1..=9).contains(&state.chain_multiplier));
                if state.is_running() && state.transition.is_none() {
                    let (lo, hi) = RingStore::window_bounds(state.escaped_index);
                    let expected: Vec<u32> = (lo..=hi).collect();
                    prop_assert_eq!(state.rings.indices().collect::<Vec<_>>(), expected);
                }
                ended_events += state
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, SimEvent::RunEnded(_)))
                    .count();
            }
            prop_assert_eq!(ended_events, usize::from(state.phase == RunPhase::Ended));
        }
    }
}
