//! Pressure and critical-orbit state machine
//!
//! Pressure is a bounded risk scalar in [0, 1]. It rises with time and taps,
//! decays constantly, and once it crosses the cohort threshold the orbit
//! goes critical: the player then has `critical_window_seconds` to escape a
//! ring or the run fails.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::{TAP_SPAM_FREE_TAPS, TAP_SPAM_STEP, TAP_SPAM_WINDOW};
use crate::tuning::DifficultyParams;

/// Critical-orbit sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrbitMode {
    #[default]
    Normal,
    Critical,
}

/// Result of advancing pressure by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureStep {
    Steady,
    /// Crossed the threshold this tick
    EnteredCritical,
    /// Critical window expired, the run must end
    TimedOut,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PressureState {
    pub pressure: f32,
    pub mode: OrbitMode,
    /// Seconds spent in the current critical orbit
    pub critical_elapsed: f32,
    pub critical_entries: u32,
    pub critical_escapes: u32,
    /// Run-clock timestamps of recent taps (trailing spam window)
    recent_taps: VecDeque<f32>,
}

impl PressureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_critical(&self) -> bool {
        self.mode == OrbitMode::Critical
    }

    /// Seconds left before a critical orbit fails (None when normal)
    pub fn critical_remaining(&self, params: &DifficultyParams) -> Option<f32> {
        self.is_critical()
            .then(|| (params.critical_window_seconds - self.critical_elapsed).max(0.0))
    }

    /// Spam multiplier for a tap given the taps already inside the window
    pub fn spam_multiplier(taps_in_window: usize) -> f32 {
        if taps_in_window > TAP_SPAM_FREE_TAPS {
            1.0 + TAP_SPAM_STEP * (taps_in_window - TAP_SPAM_FREE_TAPS) as f32
        } else {
            1.0
        }
    }

    /// Register a tap at run time `now`; returns the multiplier applied
    pub fn on_tap(&mut self, now: f32, params: &DifficultyParams) -> f32 {
        while self
            .recent_taps
            .front()
            .is_some_and(|&t| now - t > TAP_SPAM_WINDOW)
        {
            self.recent_taps.pop_front();
        }
        self.recent_taps.push_back(now);

        let multiplier = Self::spam_multiplier(self.recent_taps.len());
        self.pressure = (self.pressure + params.pressure_tap_rate * multiplier).clamp(0.0, 1.0);
        multiplier
    }

    /// Advance by `dt`: accumulate net of decay, then run the critical machine
    pub fn step(&mut self, dt: f32, params: &DifficultyParams, decay_rate: f32) -> PressureStep {
        // One clamp on the net rate; 1.0 stays reachable under decay
        let rate = params.pressure_time_rate - decay_rate;
        self.pressure = (self.pressure + rate * dt).clamp(0.0, 1.0);

        match self.mode {
            OrbitMode::Normal => {
                if self.pressure >= params.critical_threshold {
                    self.mode = OrbitMode::Critical;
                    self.critical_elapsed = 0.0;
                    self.critical_entries += 1;
                    PressureStep::EnteredCritical
                } else {
                    PressureStep::Steady
                }
            }
            OrbitMode::Critical => {
                self.critical_elapsed += dt;
                if self.critical_elapsed >= params.critical_window_seconds {
                    PressureStep::TimedOut
                } else {
                    PressureStep::Steady
                }
            }
        }
    }

    /// Apply an escape; returns true if it resolved a critical orbit
    pub fn on_escape(&mut self, params: &DifficultyParams) -> bool {
        match self.mode {
            OrbitMode::Critical => {
                self.mode = OrbitMode::Normal;
                self.pressure = 0.0;
                self.critical_elapsed = 0.0;
                self.critical_escapes += 1;
                true
            }
            OrbitMode::Normal => {
                self.pressure = (self.pressure - params.partial_reset_fraction).max(0.0);
                false
            }
        }
    }
}
