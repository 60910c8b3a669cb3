//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable dt, clamped per tick
//! - Seeded RNG only (one `Pcg32` per run)
//! - Stable iteration order (rings keyed by index)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod chain;
pub mod focus;
pub mod generator;
pub mod kinematics;
pub mod lifecycle;
pub mod pressure;
pub mod ring;
pub mod state;
pub mod store;
pub mod tick;

pub use autopilot::wants_tap;
pub use focus::focus_rate;
pub use generator::{DailyPattern, RingGenerator};
pub use lifecycle::{abandon, end_game, reset, restart, start};
pub use pressure::{OrbitMode, PressureState};
pub use ring::Ring;
pub use state::{EscapeEvent, GameState, RunPhase, RunSnapshot, SimEvent, Transition};
pub use store::RingStore;
pub use tick::{TickInput, tap, tick};
