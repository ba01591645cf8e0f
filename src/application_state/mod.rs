//! # Application State Management
//!
//! This module is the front end of the binary:
//! - Command line parsing
//! - Configuration loading and overrides
//! - Logging presentation of every turn, with pacing
//! - Running the requested generations

pub mod config_loader;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, log_enabled, trace, warn, Level};
use thiserror::Error;
use web_time::{Duration, Instant};

use crate::{
    config::SimulationConfig,
    engine_state::{
        scheduler::{Presenter, Scheduler},
        telemetry::{GenerationReport, TurnReport},
        voxels::world::World,
        EngineError,
    },
};

/// Errors that end the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadConfig {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for a configuration.
    #[error("failed to parse config file '{}': {source}", .path.display())]
    ParseConfig {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },
    /// The simulation could not be created or advanced to a new generation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Command-line arguments. Every value given here overrides the file.
#[derive(Parser, Debug, Default)]
#[command(name = "voxel-colony", version, about = "Ant colony simulation on a voxel world")]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Seed for terrain and agent randomness.
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// Number of generations to run.
    #[arg(short, long)]
    pub generations: Option<u32>,
    /// Delay between turns in milliseconds.
    #[arg(long)]
    pub pace_ms: Option<u64>,
    /// Workers spawned per generation.
    #[arg(short, long)]
    pub population: Option<usize>,
}

impl Cli {
    /// Writes the values given on the command line into `config`.
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(pace_ms) = self.pace_ms {
            config.turn_pacing_ms = pace_ms;
        }
        if let Some(population) = self.population {
            config.initial_population = population;
        }
    }
}

/// Presents every turn as a telemetry log line and waits out the pacing delay.
/// At `trace` level the full turn report, one summary per agent, is logged too.
///
/// There is no renderer attached, so chunks flagged for redraw are drained and
/// only counted.
pub struct LogPresenter {
    /// Minimum wall-clock time between two turns
    pacing: Duration,
    /// When the previous turn was presented
    last_turn: Option<Instant>,
}

impl LogPresenter {
    /// Creates a presenter that waits `pacing` between turns.
    pub fn new(pacing: Duration) -> Self {
        LogPresenter {
            pacing,
            last_turn: None,
        }
    }

    fn wait_for_next_turn(&mut self) {
        if let Some(last_turn) = self.last_turn {
            let elapsed = last_turn.elapsed();
            if elapsed < self.pacing {
                std::thread::sleep(self.pacing - elapsed);
            }
        }
        self.last_turn = Some(Instant::now());
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, report: &TurnReport, world: &mut World) {
        match report.telemetry.to_json() {
            Ok(json) => info!("{json}"),
            Err(error) => warn!("Failed to serialize telemetry: {error}"),
        }
        if log_enabled!(Level::Trace) {
            match report.to_json() {
                Ok(json) => trace!("{json}"),
                Err(error) => warn!("Failed to serialize turn {}: {error}", report.telemetry.turn),
            }
        }

        let redrawn = world.take_dirty_chunks();
        if !redrawn.is_empty() {
            debug!("{} chunks changed on turn {}", redrawn.len(), report.telemetry.turn);
        }

        self.wait_for_next_turn();
    }

    fn generation_finished(&mut self, _report: &GenerationReport) {
        self.last_turn = None;
    }
}

/// The running application: a scheduler and the presenter it reports to.
pub struct ApplicationState {
    /// Runs the simulation
    pub scheduler: Scheduler,
    /// Presents every turn
    pub presenter: LogPresenter,
    /// Generations left to run
    generations: u32,
}

impl ApplicationState {
    /// Loads the configuration named by `cli`, applies its overrides and
    /// creates the first generation.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] if the configuration cannot be loaded or is
    /// rejected, or if the first generation cannot be created.
    pub fn from_cli(cli: &Cli) -> Result<Self, AppError> {
        let mut config = config_loader::load(cli.config.as_deref())?;
        cli.apply(&mut config);
        debug!("Config: {config:?}");

        let generations = config.generations;
        let presenter = LogPresenter::new(Duration::from_millis(config.turn_pacing_ms));
        let scheduler = Scheduler::new(config)?;

        Ok(Self {
            scheduler,
            presenter,
            generations,
        })
    }

    /// Runs every configured generation.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] if a later generation cannot be created.
    pub fn run(&mut self) -> Result<Vec<GenerationReport>, AppError> {
        let reports = self.scheduler.run(self.generations, &mut self.presenter)?;
        self.generations = 0;
        Ok(reports)
    }
}
