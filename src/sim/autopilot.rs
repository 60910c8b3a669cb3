//! Demo-mode autopilot
//!
//! Picks the orbit direction that reaches the current ring's gap first,
//! treating a path blocked by the obstacle as unreachable. A fixed margin
//! keeps it from flip-flopping (and spamming pressure).

use std::f32::consts::TAU;

use super::state::GameState;
use crate::wrap_angle;

/// Seconds the other direction must win by before the autopilot taps
const SWITCH_MARGIN: f32 = 0.3;

/// Time for the ball to reach the gap going in `direction`
fn time_to_gap(state: &GameState, direction: f32) -> f32 {
    let Some(ring) = state.current_ring() else {
        return f32::INFINITY;
    };
    let speed = state.compute_orbit_speed();
    let distance = wrap_angle(direction * (ring.gap_center - state.ball_angle));
    let closing = speed - direction * ring.rotation_speed;
    if closing <= 0.0 {
        return f32::INFINITY;
    }
    if let Some(obstacle) = ring.obstacle_angle() {
        let to_obstacle = wrap_angle(direction * (obstacle - state.ball_angle));
        if to_obstacle < distance {
            return f32::INFINITY;
        }
    }
    // Already inside the gap
    if distance > TAU - ring.gap_width / 2.0 {
        return 0.0;
    }
    distance / closing
}

/// Whether reversing now gets the ball to the gap meaningfully sooner
pub fn wants_tap(state: &GameState) -> bool {
    if state.transition.is_some() {
        return false;
    }
    let ahead = time_to_gap(state, state.ball_direction);
    let behind = time_to_gap(state, -state.ball_direction);
    behind + SWITCH_MARGIN < ahead
}
