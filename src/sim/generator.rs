//! Procedural ring generation
//!
//! Pure apart from the RNG it is handed: the same index, mode, tuning and
//! RNG stream always produce the same ring.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::ring::Ring;
use crate::consts::DAILY_PATTERN_LENGTH;
use crate::tuning::{ModeConfig, ObstacleTuning, RingTuning};
use crate::wrap_angle;

/// Date-seeded sequence of gap centres shared by every player on that date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DailyPattern {
    pub date_id: String,
    pub gap_centers: Vec<f32>,
}

impl DailyPattern {
    /// Build the pattern for a date id such as "2024-01-01"
    pub fn for_date(date_id: &str) -> Self {
        let mut rng = Pcg32::seed_from_u64(fnv1a64(date_id.as_bytes()));
        let gap_centers = (0..DAILY_PATTERN_LENGTH)
            .map(|_| rng.random_range(0.0..TAU))
            .collect();
        Self {
            date_id: date_id.to_string(),
            gap_centers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gap_centers.is_empty()
    }

    /// Gap centre for a ring index (wraps modulo the pattern length)
    pub fn gap_center(&self, index: u32) -> Option<f32> {
        if self.gap_centers.is_empty() {
            return None;
        }
        let i = index as usize % self.gap_centers.len();
        Some(wrap_angle(self.gap_centers[i]))
    }
}

/// FNV-1a, stable across platforms and releases
fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Ring generator for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingGenerator {
    pub mode: ModeConfig,
    pub rings: RingTuning,
    pub obstacles: ObstacleTuning,
    /// Only consulted when the mode uses the daily pattern
    pub daily: Option<DailyPattern>,
}

impl RingGenerator {
    pub fn new(
        mode: ModeConfig,
        rings: RingTuning,
        obstacles: ObstacleTuning,
        daily: Option<DailyPattern>,
    ) -> Self {
        let daily = match daily {
            Some(pattern) if pattern.is_empty() => {
                log::warn!("Daily pattern is empty, falling back to random gaps");
                None
            }
            Some(pattern) => Some(pattern),
            None if mode.uses_daily_pattern => {
                log::warn!("Mode {} expects a daily pattern, none supplied", mode.id.as_str());
                None
            }
            None => None,
        };
        Self {
            mode,
            rings,
            obstacles,
            daily,
        }
    }

    /// Generate the ring at `index`
    pub fn generate<R: Rng + ?Sized>(&self, index: u32, rng: &mut R) -> Ring {
        let expert = self.mode.expert;
        let gap_width = self.rings.gap_width_for(expert);

        let gap_center = self
            .daily
            .as_ref()
            .filter(|_| self.mode.uses_daily_pattern)
            .and_then(|pattern| pattern.gap_center(index))
            .unwrap_or_else(|| rng.random_range(0.0..TAU));

        // Rotation: magnitude grows with depth, hard-capped, random direction
        let max_speed = self.rings.max_speed_for(expert).max(self.rings.min_speed);
        let magnitude = if max_speed > self.rings.min_speed {
            rng.random_range(self.rings.min_speed..=max_speed)
        } else {
            self.rings.min_speed
        };
        let magnitude = (magnitude * (1.0 + index as f32 * self.rings.speed_growth_per_ring))
            .min(self.rings.speed_cap);
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let mut rotation_speed = magnitude * direction;

        let max_drift = self.rings.max_drift_for(expert);
        let drift = if max_drift > 0.0 {
            rng.random_range(0.0..=max_drift)
        } else {
            0.0
        };

        let chance = self.obstacles.chance_at(index).clamp(0.0, 1.0) as f64;
        let obstacle_offset = if chance > 0.0 && rng.random_bool(chance) {
            // Keep at least 90° of clearance from the gap on both sides
            let lo = FRAC_PI_2;
            let hi = TAU - gap_width - FRAC_PI_2;
            rotation_speed *= 0.5;
            Some(if hi > lo { rng.random_range(lo..=hi) } else { lo })
        } else {
            None
        };

        Ring {
            index,
            gap_center,
            gap_width,
            rotation_speed,
            drift,
            obstacle_offset,
        }
    }
}
