//! Orbit Escape headless runner
//!
//! Plays one run with the autopilot at a fixed 60 Hz step and prints the
//! run summary. The browser build drives the library through `web::WebRun`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;
    use orbit_escape::consts::FRAME_DT;
    use orbit_escape::platform;
    use orbit_escape::sim::{self, DailyPattern, GameState, SimEvent, TickInput};
    use orbit_escape::{DifficultyParams, GameMode, Tuning};

    /// Run the orbit escape simulation headlessly under the autopilot
    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Game mode: endless, expert, sprint or daily
        #[arg(short, long, default_value = "endless")]
        mode: String,

        /// Run seed (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Daily pattern date as YYYY-MM-DD (today when omitted)
        #[arg(long)]
        date: Option<String>,

        /// JSON tuning file overriding the built-in balance table
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Difficulty cohort: standard or relaxed
        #[arg(long)]
        cohort: Option<String>,

        /// Abandon the run after this many simulated seconds
        #[arg(long, default_value_t = 300.0)]
        max_seconds: f32,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        let args = Args::parse();

        let Some(mode) = GameMode::from_str(&args.mode) else {
            log::error!("Unknown mode {:?}", args.mode);
            return ExitCode::FAILURE;
        };

        let mut tuning = match &args.tuning {
            Some(path) => match Tuning::load(path) {
                Ok(tuning) => tuning,
                Err(e) => {
                    log::error!("{e}");
                    return ExitCode::FAILURE;
                }
            },
            None => Tuning::default(),
        };
        if let Some(cohort) = &args.cohort {
            match DifficultyParams::for_cohort(cohort) {
                Some(difficulty) => tuning.difficulty = difficulty,
                None => {
                    log::error!("Unknown cohort {cohort:?}");
                    return ExitCode::FAILURE;
                }
            }
        }

        let daily = mode.config().uses_daily_pattern.then(|| {
            let date = args.date.clone().unwrap_or_else(platform::today_date_id);
            log::info!("Daily pattern for {date}");
            DailyPattern::for_date(&date)
        });

        let seed = args.seed.unwrap_or_else(platform::entropy_seed);
        let mut state = GameState::new(seed, mode, tuning, daily);
        sim::start(&mut state);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        while state.is_running() {
            if state.elapsed >= args.max_seconds {
                log::info!("Time limit reached, abandoning run");
                sim::abandon(&mut state);
                break;
            }
            sim::tick(&mut state, &input, FRAME_DT);
            for event in state.drain_events() {
                match event {
                    SimEvent::Escaped(e) if e.chain.len() > 1 => {
                        log::info!("Chain of {} (score {})", e.chain.len(), e.score)
                    }
                    SimEvent::CriticalEntered { .. } => log::info!("Critical orbit"),
                    _ => {}
                }
            }
        }

        let Some(summary) = state.summary.clone() else {
            log::error!("Run ended without a summary");
            return ExitCode::FAILURE;
        };
        if args.json {
            println!("{}", summary.to_json());
        } else {
            println!("{}", summary.cause.headline());
            println!("{}", summary.cause.explanation());
            println!(
                "Rings: {}  Time: {:.1}s  Best chain: {}  Taps: {}",
                summary.rings,
                summary.time_ms as f32 / 1000.0,
                summary.max_chain,
                summary.taps
            );
        }
        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}
