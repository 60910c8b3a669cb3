//! Orbit Escape - a ring-escape orbit arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rings, orbit, pressure, chains, run lifecycle)
//! - `tuning`: Data-driven game balance and mode configuration
//! - `summary`: Run outcome payload handed to progression/telemetry hosts
//! - `platform`: Browser/native platform abstraction

pub mod platform;
pub mod sim;
pub mod summary;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use summary::{EndCause, RunSummary};
pub use tuning::{DifficultyParams, GameMode, ModeConfig, Tuning};

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation will integrate in one tick (seconds)
    pub const MAX_DT: f32 = 0.033;
    /// Nominal frame delta used by headless runners (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Rings kept behind the current escape index
    pub const WINDOW_PAST: u32 = 2;
    /// Rings kept ahead of the current escape index
    pub const WINDOW_FUTURE: u32 = 4;

    /// Longest chain a single tick can escape
    pub const MAX_CHAIN: usize = 6;
    /// Chain multiplier ceiling
    pub const MAX_MULTIPLIER: u32 = 9;
    /// Seconds of chain timer granted per escaped ring
    pub const CHAIN_TIMER_PER_RING: f32 = 1.15;
    /// Escapes closer together than this light up the glow reward
    pub const QUICK_SUCCESSION_SECS: f32 = 0.5;
    /// First ring escaped within this share of its budget counts as perfect
    pub const PERFECT_BUDGET_FRACTION: f32 = 0.05;

    /// Transition duration for a single-ring escape (seconds)
    pub const TRANSITION_BASE_SECS: f32 = 0.12;
    /// Extra transition time per additional ring in a chain
    pub const TRANSITION_PER_EXTRA_RING: f32 = 0.05;
    /// Transition duration cap
    pub const TRANSITION_MAX_SECS: f32 = 0.4;

    /// Ring time budget floor (seconds)
    pub const RING_TIME_FLOOR: f32 = 2.6;

    /// Trailing window for tap-spam detection (seconds)
    pub const TAP_SPAM_WINDOW: f32 = 1.0;
    /// Taps allowed inside the spam window before the multiplier kicks in
    pub const TAP_SPAM_FREE_TAPS: usize = 3;
    /// Multiplier growth per tap beyond the free taps
    pub const TAP_SPAM_STEP: f32 = 0.3;

    /// Ball speed factor at full pressure (lerp from 1.0)
    pub const PRESSURE_SLOWDOWN_FLOOR: f32 = 0.45;

    /// Focus smoothing rate when the ball is comfortably inside the view
    pub const FOCUS_HZ_CALM: f32 = 0.65;
    /// Focus smoothing rate when the ball reaches the urgency edge
    pub const FOCUS_HZ_URGENT: f32 = 3.05;
    /// Screen radius (view units, 1.0 = edge) of the innermost visible ring
    pub const RING_BASE_RADIUS: f32 = 0.18;
    /// Screen radius added per ring index above focus
    pub const RING_SPACING: f32 = 0.14;
    /// Ball screen radius where focus starts to hurry
    pub const URGENCY_START_RADIUS: f32 = 0.5;
    /// Ball screen radius where focus runs at full urgency
    pub const URGENCY_EDGE_RADIUS: f32 = 0.85;

    /// Length of a generated daily gap pattern
    pub const DAILY_PATTERN_LENGTH: usize = 64;
}

/// Normalized angle to [-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest signed rotation from `from` to `to`, in [-π, π]
#[inline]
pub fn angular_difference(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
