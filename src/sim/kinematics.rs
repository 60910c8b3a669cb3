//! Orbit kinematics
//!
//! Moves the ball around its ring and spins every ring gap. Ring geometry
//! is frozen while an escape animation plays.

use rand::Rng;

use super::state::GameState;
use crate::wrap_angle;

/// Advance ball and rings by `dt`
pub(crate) fn advance(state: &mut GameState, dt: f32) {
    state.orbit_speed = state.compute_orbit_speed();
    state.ball_angle = wrap_angle(state.ball_angle + state.ball_direction * state.orbit_speed * dt);

    if state.transition.is_none() {
        let GameState { rings, rng, .. } = &mut *state;
        for ring in rings.iter_mut() {
            let jitter = if ring.drift > 0.0 {
                rng.random_range(-ring.drift / 2.0..=ring.drift / 2.0)
            } else {
                0.0
            };
            ring.rotate(jitter, dt);
        }
    }

    state.time_in_ring += dt;
    state.elapsed += dt;
    if let Some(since) = state.since_last_escape.as_mut() {
        *since += dt;
    }
}

/// Reverse the ball's orbit direction
pub(crate) fn reverse(state: &mut GameState) {
    state.ball_direction = -state.ball_direction;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lifecycle;
    use crate::sim::state::Transition;
    use crate::tuning::{GameMode, Tuning};
    use std::f32::consts::TAU;

    fn running_state() -> GameState {
        let mut state = GameState::new(7, GameMode::Endless, Tuning::default(), None);
        lifecycle::start(&mut state);
        state
    }

    #[test]
    fn test_ball_advances_with_direction() {
        let mut state = running_state();
        state.ball_angle = 1.0;
        advance(&mut state, 0.1);
        assert!((state.ball_angle - (1.0 + 0.24)).abs() < 1e-5);
        reverse(&mut state);
        advance(&mut state, 0.1);
        assert!((state.ball_angle - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ball_angle_wraps() {
        let mut state = running_state();
        state.ball_angle = TAU - 0.01;
        advance(&mut state, 0.1);
        assert!((0.0..TAU).contains(&state.ball_angle));
        assert!((state.ball_angle - 0.23).abs() < 1e-4);
    }

    #[test]
    fn test_rings_move_within_jitter_envelope() {
        let mut state = running_state();
        let before: Vec<_> = state.rings.iter().cloned().collect();
        let dt = 0.02;
        advance(&mut state, dt);
        for (old, new) in before.iter().zip(state.rings.iter()) {
            let moved = crate::angular_difference(old.gap_center, new.gap_center);
            let expected = old.rotation_speed * dt;
            assert!((moved - expected).abs() <= old.drift / 2.0 * dt + 1e-5);
        }
    }

    #[test]
    fn test_rings_frozen_during_transition() {
        let mut state = running_state();
        state.transition = Some(Transition {
            chain: vec![0],
            target_index: 1,
            progress: 0.0,
            duration: 0.12,
        });
        let before: Vec<_> = state.rings.iter().map(|r| r.gap_center).collect();
        let ball_before = state.ball_angle;
        advance(&mut state, 0.02);
        let after: Vec<_> = state.rings.iter().map(|r| r.gap_center).collect();
        assert_eq!(before, after);
        assert_ne!(state.ball_angle, ball_before);
    }

    #[test]
    fn test_timers_accumulate() {
        let mut state = running_state();
        advance(&mut state, 0.25);
        advance(&mut state, 0.25);
        assert!((state.time_in_ring - 0.5).abs() < 1e-6);
        assert!((state.elapsed - 0.5).abs() < 1e-6);
    }
}
