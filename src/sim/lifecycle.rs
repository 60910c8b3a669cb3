//! Run lifecycle and fail-condition evaluation
//!
//! Idle -> Running -> Ended. Ending is immediate: an in-flight escape
//! animation is dropped, its score stays counted and its index is never
//! committed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

use super::pressure::PressureState;
use super::state::{GameState, RunPhase, RunStats, SimEvent};
use crate::summary::{EndCause, RunSummary};
use crate::tuning::{GameMode, ScoreType};

/// Restore a fresh run state (phase Idle) from the run seed
pub fn reset(state: &mut GameState) {
    state.rng = Pcg32::seed_from_u64(state.seed);
    state.rings.clear();
    state.phase = RunPhase::Idle;
    state.escaped_index = 0;
    state.ball_angle = state.rng.random_range(0.0..TAU);
    state.ball_direction = 1.0;
    state.score = 0;
    state.chain_multiplier = 1;
    state.chain_timer = 0.0;
    state.pressure = PressureState::new();
    state.time_in_ring = 0.0;
    state.since_last_escape = None;
    state.transition = None;
    state.focus = 0.0;
    state.glow = 0.0;
    state.elapsed = 0.0;
    state.stats = RunStats::default();
    state.end_cause = None;
    state.summary = None;

    let GameState {
        rings,
        generator,
        rng,
        ..
    } = &mut *state;
    rings.ensure_window(0, generator, rng);
    state.orbit_speed = state.compute_orbit_speed();
}

/// Begin a run from a full reset
pub fn start(state: &mut GameState) {
    reset(state);
    state.phase = RunPhase::Running;
    log::info!(
        "Run started: mode={} seed={}",
        state.mode.id.as_str(),
        state.seed
    );
    state.push_event(SimEvent::RunStarted {
        mode: state.mode.id,
        seed: state.seed,
    });
}

/// Begin a run with a new seed
pub fn restart(state: &mut GameState, seed: u64) {
    state.seed = seed;
    start(state);
}

/// End the running run; no-op (None) if no run is active
pub fn end_game(state: &mut GameState, cause: EndCause) -> Option<RunSummary> {
    if state.phase != RunPhase::Running {
        return None;
    }
    if let Some(t) = state.transition.take() {
        log::debug!("Discarding escape animation to ring {}", t.target_index);
    }
    state.phase = RunPhase::Ended;
    state.end_cause = Some(cause);

    let summary = RunSummary {
        mode: state.mode.id,
        cause,
        rings: state.score,
        time_ms: (state.elapsed.max(0.0) * 1000.0).round() as u64,
        max_chain: state.stats.max_chain,
        critical_entries: state.pressure.critical_entries,
        critical_escapes: state.pressure.critical_escapes,
        best_perfect_streak: state.stats.best_perfect_streak,
        taps: state.stats.taps,
    };
    log::info!(
        "Run ended: {} after {} rings in {} ms",
        cause.as_str(),
        summary.rings,
        summary.time_ms
    );
    state.summary = Some(summary.clone());
    state.push_event(SimEvent::RunEnded(summary.clone()));
    Some(summary)
}

/// Host-requested abandonment (mode switch, navigation)
pub fn abandon(state: &mut GameState) -> Option<RunSummary> {
    end_game(state, EndCause::ModeSwitch)
}

/// Success cause for a finite-target mode
fn completion_cause(state: &GameState) -> EndCause {
    match state.mode.id {
        GameMode::Sprint => EndCause::SprintComplete,
        GameMode::Daily => EndCause::DailyComplete,
        _ => match state.mode.score_type {
            ScoreType::Time => EndCause::SprintComplete,
            ScoreType::Rings => EndCause::DailyComplete,
        },
    }
}

/// Instantaneous terminal checks, in order: obstacle, ring time, completion
///
/// The critical-orbit timeout is checked earlier in the tick.
pub(crate) fn evaluate(state: &GameState) -> Option<EndCause> {
    // The ball is passing through a gap while an escape animates
    if state.transition.is_none()
        && state
            .current_ring()
            .is_some_and(|ring| ring.obstacle_hit(state.ball_angle, state.tuning.obstacles.width))
    {
        return Some(EndCause::Obstacle);
    }

    if state.time_in_ring > state.ring_time_budget() {
        return Some(EndCause::Time);
    }

    if state
        .mode
        .finite_target
        .is_some_and(|target| state.score >= target)
    {
        return Some(completion_cause(state));
    }

    None
}
