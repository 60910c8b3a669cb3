//! Escape and chain detection
//!
//! Each tick without a pending transition scans outward from the current
//! ring. Every consecutive ring whose gap contains the ball joins the chain;
//! the first misaligned ring stops the scan, so chains never skip a ring.
//! The escape is then animated and `escaped_index` only moves on commit.

use super::state::{EscapeEvent, GameState, SimEvent, Transition};
use crate::consts::*;

/// Advance chain timers and either the pending transition or detection
pub(crate) fn step(state: &mut GameState, dt: f32) {
    decay(state, dt);

    if state.transition.is_some() {
        advance_transition(state, dt);
        return;
    }

    let chain = detect_chain(state);
    if !chain.is_empty() {
        apply_escape(state, chain);
    }
}

/// Longest aligned prefix of rings starting at the current ring
pub(crate) fn detect_chain(state: &mut GameState) -> Vec<u32> {
    let GameState {
        rings,
        generator,
        rng,
        ball_angle,
        escaped_index,
        ..
    } = &mut *state;

    let mut chain = Vec::new();
    for index in (*escaped_index..).take(MAX_CHAIN) {
        let ring = rings.ensure_ring(index, generator, rng);
        if !ring.is_aligned(*ball_angle) {
            break;
        }
        chain.push(index);
    }
    chain
}

/// Animation length for a chain of `len` rings
pub(crate) fn transition_duration(len: usize) -> f32 {
    let extra = len.saturating_sub(1) as f32 * TRANSITION_PER_EXTRA_RING;
    (TRANSITION_BASE_SECS + extra).min(TRANSITION_MAX_SECS)
}

/// Score a detected chain and schedule its transition
pub(crate) fn apply_escape(state: &mut GameState, chain: Vec<u32>) {
    let k = chain.len() as u32;
    let budget = state.ring_time_budget();
    let perfect = state.time_in_ring <= budget * PERFECT_BUDGET_FRACTION;
    let quick = state
        .since_last_escape
        .is_some_and(|since| since <= QUICK_SUCCESSION_SECS);

    state.score += k;
    let critical_escape = state.pressure.on_escape(&state.tuning.difficulty);

    state.time_in_ring = 0.0;
    state.since_last_escape = Some(0.0);
    state.chain_multiplier = (state.chain_multiplier + k).min(MAX_MULTIPLIER);
    state.chain_timer += CHAIN_TIMER_PER_RING * k as f32;
    if quick {
        state.glow = 1.0;
    }

    state.stats.max_chain = state.stats.max_chain.max(k);
    if perfect {
        state.stats.perfect_streak += 1;
        state.stats.best_perfect_streak = state
            .stats
            .best_perfect_streak
            .max(state.stats.perfect_streak);
    } else {
        state.stats.perfect_streak = 0;
    }

    let target_index = state.escaped_index + k;
    log::debug!(
        "Escaped {:?} -> ring {} (score {}, x{}{}{})",
        chain,
        target_index,
        state.score,
        state.chain_multiplier,
        if critical_escape { ", critical escape" } else { "" },
        if perfect { ", perfect" } else { "" },
    );

    state.push_event(SimEvent::Escaped(EscapeEvent {
        chain: chain.clone(),
        score: state.score,
        multiplier: state.chain_multiplier,
        quick,
        perfect,
        critical_escape,
    }));

    state.transition = Some(Transition {
        duration: transition_duration(chain.len()),
        chain,
        target_index,
        progress: 0.0,
    });
}

/// Progress the escape animation, committing the new index when done
pub(crate) fn advance_transition(state: &mut GameState, dt: f32) -> bool {
    let Some(transition) = state.transition.as_mut() else {
        return false;
    };
    transition.progress = (transition.progress + dt / transition.duration).min(1.0);
    if transition.progress < 1.0 {
        return false;
    }

    let target = transition.target_index;
    state.transition = None;
    state.escaped_index = target;
    let GameState {
        rings,
        generator,
        rng,
        ..
    } = &mut *state;
    rings.ensure_window(target, generator, rng);
    state.push_event(SimEvent::TransitionCommitted {
        escaped_index: target,
    });
    true
}

/// Chain timer and glow decay
fn decay(state: &mut GameState, dt: f32) {
    if state.chain_timer > 0.0 {
        state.chain_timer = (state.chain_timer - dt).max(0.0);
        if state.chain_timer == 0.0 {
            state.chain_multiplier = 1;
        }
    }
    if state.glow > 0.0 {
        state.glow = (state.glow - dt * 2.0).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lifecycle;
    use crate::tuning::{GameMode, Tuning};
    use std::f32::consts::PI;

    /// Running state with rings 0..6 at fixed gaps and no rotation
    fn context(gaps: &[f32]) -> GameState {
        let mut state = GameState::new(21, GameMode::Endless, Tuning::default(), None);
        lifecycle::start(&mut state);
        for (i, &gap) in gaps.iter().enumerate() {
            let GameState { rings, generator, rng, .. } = &mut state;
            let ring = rings.ensure_ring(i as u32, generator, rng);
            ring.gap_center = gap;
            ring.gap_width = 0.5;
            ring.rotation_speed = 0.0;
            ring.drift = 0.0;
            ring.obstacle_offset = None;
        }
        state.ball_angle = 0.0;
        state
    }

    #[test]
    fn test_chain_stops_at_first_misaligned_ring() {
        // Rings 0, 1 and 3 aligned, ring 2 not
        let mut state = context(&[0.0, 0.1, PI, 0.0, PI, PI]);
        assert_eq!(detect_chain(&mut state), vec![0, 1]);
    }

    #[test]
    fn test_no_chain_when_current_ring_misaligned() {
        let mut state = context(&[PI, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(detect_chain(&mut state).is_empty());
    }

    #[test]
    fn test_chain_capped() {
        let mut state = context(&[0.0; 8]);
        assert_eq!(detect_chain(&mut state), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_transition_duration_scales_and_caps() {
        assert!((transition_duration(1) - 0.12).abs() < 1e-6);
        assert!((transition_duration(3) - 0.22).abs() < 1e-6);
        assert_eq!(transition_duration(20), TRANSITION_MAX_SECS);
    }

    #[test]
    fn test_escape_defers_index_commit() {
        let mut state = context(&[0.0, 0.2, PI, PI, PI, PI]);
        step(&mut state, 0.0);
        assert_eq!(state.score, 2);
        assert_eq!(state.escaped_index, 0);
        assert_eq!(state.chain_multiplier, 3);
        assert!((state.chain_timer - 2.3).abs() < 1e-6);
        let t = state.transition.clone().expect("transition scheduled");
        assert_eq!(t.chain, vec![0, 1]);
        assert_eq!(t.target_index, 2);

        // No new detection while the animation plays
        step(&mut state, 0.1);
        assert_eq!(state.score, 2);
        assert_eq!(state.escaped_index, 0);

        step(&mut state, 0.1);
        assert!(state.transition.is_none());
        assert_eq!(state.escaped_index, 2);
        assert_eq!(state.rings.indices().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_multiplier_caps_and_decays() {
        let mut state = context(&[0.0; 6]);
        state.chain_multiplier = 7;
        apply_escape(&mut state, vec![0, 1, 2, 3]);
        assert_eq!(state.chain_multiplier, MAX_MULTIPLIER);
        state.transition = None;
        let timer = state.chain_timer;
        decay(&mut state, timer + 0.01);
        assert_eq!(state.chain_timer, 0.0);
        assert_eq!(state.chain_multiplier, 1);
    }

    #[test]
    fn test_quick_succession_sets_glow() {
        let mut state = context(&[0.0; 6]);
        apply_escape(&mut state, vec![0]);
        assert_eq!(state.glow, 0.0);
        state.since_last_escape = Some(0.3);
        apply_escape(&mut state, vec![1]);
        assert_eq!(state.glow, 1.0);
        state.since_last_escape = Some(0.9);
        let events_before = state.drain_events().len();
        assert_eq!(events_before, 3);
        apply_escape(&mut state, vec![2]);
        match state.drain_events().pop() {
            Some(SimEvent::Escaped(e)) => assert!(!e.quick),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_perfect_streak() {
        let mut state = context(&[0.0; 6]);
        state.time_in_ring = 0.1;
        apply_escape(&mut state, vec![0]);
        state.time_in_ring = 0.2;
        apply_escape(&mut state, vec![1]);
        assert_eq!(state.stats.perfect_streak, 2);
        state.time_in_ring = 3.0;
        apply_escape(&mut state, vec![2]);
        assert_eq!(state.stats.perfect_streak, 0);
        assert_eq!(state.stats.best_perfect_streak, 2);
    }

    #[test]
    fn test_critical_escape_reported() {
        let mut state = context(&[0.0; 6]);
        state.pressure.pressure = 1.0;
        state.pressure.step(0.0, &state.tuning.difficulty, 0.0);
        assert!(state.pressure.is_critical());
        apply_escape(&mut state, vec![0]);
        assert!(!state.pressure.is_critical());
        assert_eq!(state.pressure.pressure, 0.0);
        assert_eq!(state.pressure.critical_escapes, 1);
    }
}
