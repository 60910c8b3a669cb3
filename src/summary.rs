//! Run outcome reporting
//!
//! The summary is the only channel through which a finished run becomes
//! visible to progression, missions and telemetry.

use serde::{Deserialize, Serialize};

use crate::tuning::GameMode;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCause {
    /// Critical orbit expired without an escape
    PressureFail,
    /// Ball ran into an obstacle
    Obstacle,
    /// Ring time budget ran out
    Time,
    /// Host abandoned the run (mode change, navigation)
    ModeSwitch,
    /// Sprint target reached
    SprintComplete,
    /// Daily target reached
    DailyComplete,
}

impl EndCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCause::PressureFail => "pressure_fail",
            EndCause::Obstacle => "obstacle",
            EndCause::Time => "time",
            EndCause::ModeSwitch => "mode_switch",
            EndCause::SprintComplete => "sprint_complete",
            EndCause::DailyComplete => "daily_complete",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EndCause::SprintComplete | EndCause::DailyComplete)
    }

    /// Short game-over title
    pub fn headline(&self) -> &'static str {
        match self {
            EndCause::PressureFail => "Orbit Collapsed",
            EndCause::Obstacle => "Impact!",
            EndCause::Time => "Out of Time",
            EndCause::ModeSwitch => "Run Abandoned",
            EndCause::SprintComplete => "Sprint Complete",
            EndCause::DailyComplete => "Daily Cleared",
        }
    }

    /// One-line explanation of the cause
    pub fn explanation(&self) -> &'static str {
        match self {
            EndCause::PressureFail => "The critical orbit ran out before you escaped a ring.",
            EndCause::Obstacle => "The ball hit a spinning obstacle on its ring.",
            EndCause::Time => "You stayed in one ring longer than its time budget.",
            EndCause::ModeSwitch => "The run was ended before it finished.",
            EndCause::SprintComplete => "All sprint rings escaped. Check your time!",
            EndCause::DailyComplete => "Every ring of today's pattern escaped.",
        }
    }
}

/// Terminal run payload, emitted exactly once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: GameMode,
    pub cause: EndCause,
    /// Rings escaped
    pub rings: u32,
    /// Run duration in milliseconds
    pub time_ms: u64,
    /// Longest single-tick chain
    pub max_chain: u32,
    pub critical_entries: u32,
    pub critical_escapes: u32,
    /// Longest run of perfect escapes
    #[serde(default)]
    pub best_perfect_streak: u32,
    /// Taps made during the run
    #[serde(default)]
    pub taps: u32,
}

impl RunSummary {
    /// Serialize for a host bridge (telemetry, JS)
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("Failed to serialize run summary: {e}");
            "null".to_string()
        })
    }
}
