//! Ring descriptor
//!
//! A ring is a rotating annulus with one gap. Everything except the gap
//! centre is fixed when the ring is generated:
//! - gap_width: angular width of the gap (radians)
//! - rotation_speed / drift: how the gap moves each tick
//! - obstacle_offset: obstacle angle relative to the gap centre (co-rotates)

use serde::{Deserialize, Serialize};

use crate::{angular_difference, wrap_angle};

/// One ring of the stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub index: u32,
    /// Gap centre angle, kept in [0, 2π)
    pub gap_center: f32,
    /// Gap angular width (radians)
    pub gap_width: f32,
    /// Signed rotation speed (rad/s)
    pub rotation_speed: f32,
    /// Jitter envelope (rad/s); each tick adds uniform noise in ±drift/2
    pub drift: f32,
    /// Obstacle offset from the gap centre, None if the ring has none
    pub obstacle_offset: Option<f32>,
}

impl Ring {
    pub fn has_obstacle(&self) -> bool {
        self.obstacle_offset.is_some()
    }

    /// Absolute obstacle angle, if any
    pub fn obstacle_angle(&self) -> Option<f32> {
        self.obstacle_offset.map(|offset| wrap_angle(self.gap_center + offset))
    }

    /// Whether a ball at `ball_angle` sits inside the gap (hard boundary)
    pub fn is_aligned(&self, ball_angle: f32) -> bool {
        angular_difference(ball_angle, self.gap_center).abs() <= self.gap_width / 2.0
    }

    /// Whether a ball at `ball_angle` touches the obstacle
    pub fn obstacle_hit(&self, ball_angle: f32, obstacle_width: f32) -> bool {
        self.obstacle_angle().is_some_and(|angle| {
            angular_difference(ball_angle, angle).abs() <= obstacle_width / 2.0
        })
    }

    /// Advance the gap by `(rotation_speed + jitter) * dt`
    pub fn rotate(&mut self, jitter: f32, dt: f32) {
        self.gap_center = wrap_angle(self.gap_center + (self.rotation_speed + jitter) * dt);
    }
}
