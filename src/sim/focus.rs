//! View focus follower
//!
//! Eases the renderer's focus index toward the current escape index. The
//! smoothing rate ramps up as the ball drifts toward the edge of the view.

use super::state::GameState;
use crate::consts::*;
use crate::lerp;

/// Smoothing rate (Hz) for a ball at `ball_radius` view units
pub fn focus_rate(ball_radius: f32) -> f32 {
    let t = ((ball_radius - URGENCY_START_RADIUS) / (URGENCY_EDGE_RADIUS - URGENCY_START_RADIUS))
        .clamp(0.0, 1.0);
    // smoothstep
    let t = t * t * (3.0 - 2.0 * t);
    lerp(FOCUS_HZ_CALM, FOCUS_HZ_URGENT, t)
}

pub(crate) fn follow(state: &mut GameState, dt: f32) {
    let target = state.escaped_index as f32;
    let hz = focus_rate(state.ball_screen_radius());
    let alpha = 1.0 - (-hz * dt).exp();
    state.focus += (target - state.focus) * alpha;
}
