//! Browser bindings
//!
//! A thin `wasm_bindgen` facade over the simulation. The host page owns
//! the animation frame loop and rendering; it feeds taps and frame deltas
//! in and pulls snapshots and events out as JSON.

use wasm_bindgen::prelude::*;

use crate::platform;
use crate::sim::{self, DailyPattern, GameState, TickInput};
use crate::tuning::{DifficultyParams, GameMode, Tuning};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Orbit Escape core loaded");
}

#[wasm_bindgen]
pub struct WebRun {
    state: GameState,
    input: TickInput,
}

#[wasm_bindgen]
impl WebRun {
    /// Create an idle run for `mode` ("endless", "expert", "sprint", "daily")
    /// using the difficulty preset named by `cohort`
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, cohort: &str) -> WebRun {
        let mode = GameMode::from_str(mode).unwrap_or_else(|| {
            log::warn!("Unknown mode {mode:?}, using endless");
            GameMode::Endless
        });
        let difficulty = DifficultyParams::for_cohort(cohort).unwrap_or_else(|| {
            log::warn!("Unknown cohort {cohort:?}, using standard");
            DifficultyParams::standard()
        });
        let tuning = Tuning {
            difficulty,
            ..Tuning::default()
        };
        let daily = mode
            .config()
            .uses_daily_pattern
            .then(|| DailyPattern::for_date(&platform::today_date_id()));

        WebRun {
            state: GameState::new(platform::entropy_seed(), mode, tuning, daily),
            input: TickInput::default(),
        }
    }

    /// Start (or restart) with a fresh seed
    pub fn start(&mut self) {
        sim::restart(&mut self.state, platform::entropy_seed());
        self.input = TickInput::default();
    }

    /// Queue a direction reversal for the next frame
    pub fn tap(&mut self) {
        self.input.tap = true;
    }

    #[wasm_bindgen(js_name = setAutopilot)]
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    /// Advance by one animation frame (`dt_ms` milliseconds)
    pub fn frame(&mut self, dt_ms: f64) {
        sim::tick(&mut self.state, &self.input, (dt_ms / 1000.0) as f32);
        self.input.tap = false;
        self.input.abandon = false;
    }

    /// End the run as a mode switch
    pub fn abandon(&mut self) {
        sim::abandon(&mut self.state);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> String {
        to_json(&self.state.snapshot())
    }

    /// Current ring window as JSON (index, gap, obstacle) for the renderer
    #[wasm_bindgen(js_name = ringsJson)]
    pub fn rings_json(&self) -> String {
        let rings: Vec<_> = self.state.rings.iter().collect();
        to_json(&rings)
    }

    #[wasm_bindgen(js_name = drainEventsJson)]
    pub fn drain_events_json(&mut self) -> String {
        to_json(&self.state.drain_events())
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize: {e}");
        "null".to_string()
    })
}
