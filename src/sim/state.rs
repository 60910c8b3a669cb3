//! Simulation context and core run types
//!
//! `GameState` owns everything a run mutates. Subsystems borrow it mutably
//! from the tick; hosts only read snapshots and drain events between ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::generator::{DailyPattern, RingGenerator};
use super::pressure::PressureState;
use super::ring::Ring;
use super::store::RingStore;
use crate::consts::*;
use crate::summary::{EndCause, RunSummary};
use crate::tuning::{GameMode, ModeConfig, Tuning};
use crate::{lerp, polar_to_cartesian};

/// Run lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunPhase {
    /// Created, never started
    #[default]
    Idle,
    Running,
    /// Terminal until the next start
    Ended,
}

/// Escape animation in flight
///
/// `escaped_index` is only advanced once `progress` reaches 1, so alignment
/// checks during the animation still run against the pre-escape ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Escaped ring indices, ascending
    pub chain: Vec<u32>,
    pub target_index: u32,
    /// 0..=1
    pub progress: f32,
    /// Seconds
    pub duration: f32,
}

/// Per-escape delta handed to hosts for mid-run achievement checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapeEvent {
    pub chain: Vec<u32>,
    pub score: u32,
    pub multiplier: u32,
    /// Followed the previous escape within the quick-succession window
    pub quick: bool,
    /// First ring escaped within 5% of its time budget
    pub perfect: bool,
    /// Resolved a critical orbit
    pub critical_escape: bool,
}

/// Events emitted by the simulation, drained by the host after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunStarted { mode: GameMode, seed: u64 },
    CriticalEntered { pressure: f32 },
    Escaped(EscapeEvent),
    TransitionCommitted { escaped_index: u32 },
    RunEnded(RunSummary),
}

/// Counters reported in the run summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub max_chain: u32,
    pub perfect_streak: u32,
    pub best_perfect_streak: u32,
    pub taps: u32,
}

/// Post-tick view of the run for renderers and HUDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub phase: RunPhase,
    pub mode: GameMode,
    pub score: u32,
    pub escaped_index: u32,
    pub ball_angle: f32,
    pub ball_direction: f32,
    pub orbit_speed: f32,
    pub pressure: f32,
    pub critical: bool,
    pub critical_remaining: Option<f32>,
    pub chain_multiplier: u32,
    pub chain_timer: f32,
    /// Escape animation progress (None when idle)
    pub transition_progress: Option<f32>,
    pub focus: f32,
    pub time_in_ring: f32,
    pub ring_time_budget: f32,
    pub glow: f32,
    pub elapsed: f32,
    pub end_cause: Option<EndCause>,
}

/// Complete simulation context for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Balance table, fixed for the run
    pub tuning: Tuning,
    pub mode: ModeConfig,
    pub generator: RingGenerator,
    pub rings: RingStore,
    pub phase: RunPhase,

    /// Ring the ball currently occupies
    pub escaped_index: u32,
    /// Ball angle in [0, 2π)
    pub ball_angle: f32,
    /// +1 or -1
    pub ball_direction: f32,
    /// Derived each tick
    pub orbit_speed: f32,
    /// Total rings escaped
    pub score: u32,

    pub chain_multiplier: u32,
    pub chain_timer: f32,
    pub pressure: PressureState,
    pub time_in_ring: f32,
    /// Seconds since the last escape (None before the first)
    pub since_last_escape: Option<f32>,
    pub transition: Option<Transition>,

    /// Smoothed view index
    pub focus: f32,
    /// Quick-succession glow (cosmetic, decays)
    pub glow: f32,
    /// Run clock (seconds)
    pub elapsed: f32,
    pub stats: RunStats,
    pub end_cause: Option<EndCause>,
    pub summary: Option<RunSummary>,
    events: Vec<SimEvent>,
}

impl GameState {
    /// Create an idle simulation; call `lifecycle::start` to begin a run
    ///
    /// Invalid tuning falls back to defaults rather than failing.
    pub fn new(seed: u64, mode: GameMode, tuning: Tuning, daily: Option<DailyPattern>) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(err) => {
                log::warn!("Invalid tuning ({err}), using defaults");
                Tuning::default()
            }
        };
        let mode = mode.config();
        let daily = if mode.uses_daily_pattern { daily } else { None };
        let generator = RingGenerator::new(mode, tuning.rings, tuning.obstacles, daily);

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            mode,
            generator,
            rings: RingStore::new(),
            phase: RunPhase::Idle,
            escaped_index: 0,
            ball_angle: 0.0,
            ball_direction: 1.0,
            orbit_speed: 0.0,
            score: 0,
            chain_multiplier: 1,
            chain_timer: 0.0,
            pressure: PressureState::new(),
            time_in_ring: 0.0,
            since_last_escape: None,
            transition: None,
            focus: 0.0,
            glow: 0.0,
            elapsed: 0.0,
            stats: RunStats::default(),
            end_cause: None,
            summary: None,
            events: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn current_ring(&self) -> Option<&Ring> {
        self.rings.get(self.escaped_index)
    }

    /// Time budget for the current ring
    pub fn ring_time_budget(&self) -> f32 {
        self.tuning.ring_time_budget(self.score)
    }

    /// Ball angular speed for the current score and pressure
    pub fn compute_orbit_speed(&self) -> f32 {
        let orbit = &self.tuning.orbit;
        let base = (orbit.base_speed + self.score as f32 * orbit.speed_growth_per_point)
            .min(orbit.speed_cap);
        base * lerp(1.0, PRESSURE_SLOWDOWN_FLOOR, self.pressure.pressure)
    }

    pub fn transition_progress(&self) -> Option<f32> {
        self.transition.as_ref().map(|t| t.progress)
    }

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ring radius on screen (view units, 1.0 = edge) relative to focus
    pub fn ring_screen_radius(&self, index: u32) -> f32 {
        RING_BASE_RADIUS + (index as f32 - self.focus) * RING_SPACING
    }

    /// Ball radius on screen, sliding outward during an escape animation
    pub fn ball_screen_radius(&self) -> f32 {
        let from = self.ring_screen_radius(self.escaped_index);
        match &self.transition {
            Some(t) => lerp(from, self.ring_screen_radius(t.target_index), t.progress),
            None => from,
        }
    }

    /// Ball position in view space
    pub fn ball_position(&self) -> Vec2 {
        polar_to_cartesian(self.ball_screen_radius(), self.ball_angle)
    }

    /// Consistent copy of the observable run state
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            phase: self.phase,
            mode: self.mode.id,
            score: self.score,
            escaped_index: self.escaped_index,
            ball_angle: self.ball_angle,
            ball_direction: self.ball_direction,
            orbit_speed: self.orbit_speed,
            pressure: self.pressure.pressure,
            critical: self.pressure.is_critical(),
            critical_remaining: self.pressure.critical_remaining(&self.tuning.difficulty),
            chain_multiplier: self.chain_multiplier,
            chain_timer: self.chain_timer,
            transition_progress: self.transition_progress(),
            focus: self.focus,
            time_in_ring: self.time_in_ring,
            ring_time_budget: self.ring_time_budget(),
            glow: self.glow,
            elapsed: self.elapsed,
            end_cause: self.end_cause,
        }
    }
}
