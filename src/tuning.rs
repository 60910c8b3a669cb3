//! Game balance and mode configuration
//!
//! Loaded from JSON by hosts (or left at defaults). Every field has a serde
//! default so partial tuning files work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Play modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Endless,
    Expert,
    Sprint,
    Daily,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Endless => "endless",
            GameMode::Expert => "expert",
            GameMode::Sprint => "sprint",
            GameMode::Daily => "daily",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "endless" | "classic" => Some(GameMode::Endless),
            "expert" | "hard" => Some(GameMode::Expert),
            "sprint" => Some(GameMode::Sprint),
            "daily" => Some(GameMode::Daily),
            _ => None,
        }
    }

    /// Static mode configuration for this mode
    pub fn config(&self) -> ModeConfig {
        match self {
            GameMode::Endless => ModeConfig {
                id: *self,
                finite_target: None,
                uses_daily_pattern: false,
                score_type: ScoreType::Rings,
                expert: false,
            },
            GameMode::Expert => ModeConfig {
                id: *self,
                finite_target: None,
                uses_daily_pattern: false,
                score_type: ScoreType::Rings,
                expert: true,
            },
            GameMode::Sprint => ModeConfig {
                id: *self,
                finite_target: Some(30),
                uses_daily_pattern: false,
                score_type: ScoreType::Time,
                expert: false,
            },
            GameMode::Daily => ModeConfig {
                id: *self,
                finite_target: Some(40),
                uses_daily_pattern: true,
                score_type: ScoreType::Rings,
                expert: false,
            },
        }
    }
}

/// How a mode ranks its runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    Rings,
    Time,
}

/// Mode configuration read by the core (never mutated by it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub id: GameMode,
    /// Rings needed to complete the mode (None = endless)
    pub finite_target: Option<u32>,
    /// Gap centres come from the daily pattern
    pub uses_daily_pattern: bool,
    pub score_type: ScoreType,
    /// Narrow gaps and faster rings
    pub expert: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        GameMode::Endless.config()
    }
}

/// Per-cohort difficulty parameters, fixed for the duration of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyParams {
    /// Seconds a critical orbit may last before the run fails
    pub critical_window_seconds: f32,
    /// Pressure gained per second
    pub pressure_time_rate: f32,
    /// Pressure gained per tap (before spam multiplier)
    pub pressure_tap_rate: f32,
    /// Pressure level that starts a critical orbit
    pub critical_threshold: f32,
    /// Pressure removed by an escape outside critical orbit
    pub partial_reset_fraction: f32,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self::standard()
    }
}

impl DifficultyParams {
    /// Standard cohort (12 second critical window)
    pub fn standard() -> Self {
        Self {
            critical_window_seconds: 12.0,
            pressure_time_rate: 0.055,
            pressure_tap_rate: 0.04,
            critical_threshold: 0.85,
            partial_reset_fraction: 0.35,
        }
    }

    /// Relaxed cohort (14 second critical window)
    pub fn relaxed() -> Self {
        Self {
            critical_window_seconds: 14.0,
            ..Self::standard()
        }
    }

    pub fn for_cohort(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "a" | "control" => Some(Self::standard()),
            "relaxed" | "b" => Some(Self::relaxed()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.critical_window_seconds.is_finite() && self.critical_window_seconds > 0.0) {
            return Err(invalid("critical_window_seconds", "must be positive"));
        }
        if !(self.pressure_time_rate.is_finite() && self.pressure_time_rate >= 0.0) {
            return Err(invalid("pressure_time_rate", "must be non-negative"));
        }
        if !(self.pressure_tap_rate.is_finite() && self.pressure_tap_rate >= 0.0) {
            return Err(invalid("pressure_tap_rate", "must be non-negative"));
        }
        if !(self.critical_threshold.is_finite()
            && self.critical_threshold > 0.0
            && self.critical_threshold <= 1.0)
        {
            return Err(invalid("critical_threshold", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.partial_reset_fraction) {
            return Err(invalid("partial_reset_fraction", "must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Ring generation tables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingTuning {
    /// Gap angular width (radians) in normal modes
    pub gap_width: f32,
    /// Gap angular width (radians) in expert mode
    pub gap_width_expert: f32,
    /// Slowest ring rotation (rad/s)
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_speed_expert: f32,
    /// Relative speed growth per ring index
    pub speed_growth_per_ring: f32,
    /// Absolute rotation speed cap (rad/s)
    pub speed_cap: f32,
    /// Upper bound of the per-ring drift envelope (rad/s)
    pub max_drift: f32,
    pub max_drift_expert: f32,
}

impl Default for RingTuning {
    fn default() -> Self {
        Self {
            gap_width: 0.56,
            gap_width_expert: 0.42,
            min_speed: 0.35,
            max_speed: 1.1,
            max_speed_expert: 1.45,
            speed_growth_per_ring: 0.015,
            speed_cap: 2.2,
            max_drift: 0.25,
            max_drift_expert: 0.4,
        }
    }
}

impl RingTuning {
    pub fn gap_width_for(&self, expert: bool) -> f32 {
        if expert { self.gap_width_expert } else { self.gap_width }
    }

    pub fn max_speed_for(&self, expert: bool) -> f32 {
        if expert { self.max_speed_expert } else { self.max_speed }
    }

    pub fn max_drift_for(&self, expert: bool) -> f32 {
        if expert { self.max_drift_expert } else { self.max_drift }
    }
}

/// Obstacle eligibility ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// First ring index that may carry an obstacle
    pub min_index: u32,
    /// Placement chance at `min_index`
    pub base_chance: f32,
    /// Placement chance once the ramp completes
    pub max_chance: f32,
    /// Rings over which the chance ramps from base to max
    pub ramp_rings: u32,
    /// Angular width of an obstacle (radians)
    pub width: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            min_index: 5,
            base_chance: 0.10,
            max_chance: 0.35,
            ramp_rings: 40,
            width: 0.22,
        }
    }
}

impl ObstacleTuning {
    /// Placement chance for a ring index (0 below the eligibility floor)
    pub fn chance_at(&self, index: u32) -> f32 {
        if index < self.min_index {
            return 0.0;
        }
        if self.ramp_rings == 0 {
            return self.max_chance;
        }
        let t = ((index - self.min_index) as f32 / self.ramp_rings as f32).min(1.0);
        crate::lerp(self.base_chance, self.max_chance, t)
    }
}

/// Ball orbit and ring timer tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitTuning {
    /// Ball angular speed at score 0 (rad/s)
    pub base_speed: f32,
    pub speed_growth_per_point: f32,
    pub speed_cap: f32,
    /// Ring time budget at score 0 (seconds)
    pub max_ring_time: f32,
    pub ring_time_reduction_per_point: f32,
    /// Pressure removed per second, always applied
    pub pressure_decay_rate: f32,
}

impl Default for OrbitTuning {
    fn default() -> Self {
        Self {
            base_speed: 2.4,
            speed_growth_per_point: 0.025,
            speed_cap: 4.2,
            max_ring_time: 7.5,
            ring_time_reduction_per_point: 0.06,
            pressure_decay_rate: 0.02,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: DifficultyParams,
    pub rings: RingTuning,
    pub obstacles: ObstacleTuning,
    pub orbit: OrbitTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        self.difficulty.validate()?;

        let r = &self.rings;
        let ring_floats = [
            ("rings.gap_width", r.gap_width),
            ("rings.gap_width_expert", r.gap_width_expert),
            ("rings.min_speed", r.min_speed),
            ("rings.max_speed", r.max_speed),
            ("rings.max_speed_expert", r.max_speed_expert),
            ("rings.speed_growth_per_ring", r.speed_growth_per_ring),
            ("rings.speed_cap", r.speed_cap),
            ("rings.max_drift", r.max_drift),
            ("rings.max_drift_expert", r.max_drift_expert),
        ];
        for (field, value) in ring_floats {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        for (field, width) in [
            ("rings.gap_width", r.gap_width),
            ("rings.gap_width_expert", r.gap_width_expert),
        ] {
            if !(width > 0.0 && width <= std::f32::consts::PI) {
                return Err(invalid(field, "must be in (0, π]"));
            }
        }
        if !(r.min_speed >= 0.0
            && r.min_speed <= r.max_speed
            && r.min_speed <= r.max_speed_expert)
        {
            return Err(invalid("rings.min_speed", "must be non-negative and below max speeds"));
        }
        if r.speed_growth_per_ring < 0.0 {
            return Err(invalid("rings.speed_growth_per_ring", "must be non-negative"));
        }
        if r.speed_cap < r.min_speed {
            return Err(invalid("rings.speed_cap", "must be at least min_speed"));
        }
        if r.max_drift < 0.0 || r.max_drift_expert < 0.0 {
            return Err(invalid("rings.max_drift", "must be non-negative"));
        }

        let o = &self.obstacles;
        if !(0.0..=1.0).contains(&o.base_chance) || !(0.0..=1.0).contains(&o.max_chance) {
            return Err(invalid("obstacles.chance", "must be in [0, 1]"));
        }
        if !(o.width > 0.0 && o.width < std::f32::consts::PI) {
            return Err(invalid("obstacles.width", "must be in (0, π)"));
        }

        let b = &self.orbit;
        let orbit_floats = [
            ("orbit.base_speed", b.base_speed),
            ("orbit.speed_growth_per_point", b.speed_growth_per_point),
            ("orbit.speed_cap", b.speed_cap),
            ("orbit.max_ring_time", b.max_ring_time),
            ("orbit.ring_time_reduction_per_point", b.ring_time_reduction_per_point),
            ("orbit.pressure_decay_rate", b.pressure_decay_rate),
        ];
        for (field, value) in orbit_floats {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        if !(b.base_speed > 0.0 && b.speed_cap >= b.base_speed) {
            return Err(invalid("orbit.base_speed", "must be positive and below speed_cap"));
        }
        if b.max_ring_time <= 0.0 || b.ring_time_reduction_per_point < 0.0 {
            return Err(invalid("orbit.max_ring_time", "ring budget must be positive"));
        }
        if b.pressure_decay_rate < 0.0 {
            return Err(invalid("orbit.pressure_decay_rate", "must be non-negative"));
        }
        Ok(())
    }

    /// Per-ring time budget at the given score
    pub fn ring_time_budget(&self, score: u32) -> f32 {
        (self.orbit.max_ring_time - score as f32 * self.orbit.ring_time_reduction_per_point)
            .max(crate::consts::RING_TIME_FLOOR)
    }
}
