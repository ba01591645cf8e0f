#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Colony
//!
//! An ant colony simulation on a finite, procedurally generated voxel world.
//!
//! A queen and her workers live on noise-generated terrain sealed in a
//! container bowl. Every turn each ant may dig, climb, forage mulch, share
//! health with a colocated nestmate or walk toward the weakest member of the
//! colony, while the queen periodically lays nest blocks at the cost of her own
//! health. A generation lasts until the queen dies.
//!
//! ## Key Modules
//!
//! * `config` - The serializable configuration bundle and its validation
//! * `engine_state` - The world, the colony, the decision engine and the scheduler
//! * `application_state` - Command line, config loading and log presentation
//!
//! ## Architecture
//!
//! The simulation is single threaded and turn synchronous:
//! * World generation fills a dense voxel grid from seeded noise
//! * The scheduler dispatches the queen, then every worker, once per turn
//! * Agents mutate the world only through bounds-checked block writes
//! * Every write flags the affected chunks so an external renderer can redraw them
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(error) = voxel_colony::run() {
//!         eprintln!("{error}");
//!     }
//! }
//! ```
//!
//! Or drive a simulation directly:
//!
//! ```no_run
//! use voxel_colony::{config::SimulationConfig, engine_state::scheduler::{Headless, Scheduler}};
//!
//! let mut scheduler = Scheduler::new(SimulationConfig::default()).unwrap();
//! let report = scheduler.run_generation(&mut Headless);
//! println!("the queen laid {} nests", report.nests_produced);
//! ```

use application_state::{AppError, ApplicationState, Cli};
use clap::Parser;
use log::info;

pub mod application_state;
pub mod config;
pub mod engine_state;

/// Parses the command line, initializes logging and runs every configured
/// generation.
///
/// Logging goes to stdout and is filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns an [`AppError`] if the configuration cannot be loaded or a
/// generation cannot be created.
pub fn run() -> Result<(), AppError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let cli = Cli::parse();

    let mut state = ApplicationState::from_cli(&cli)?;
    let reports = state.run()?;

    let nests: u32 = reports.iter().map(|report| report.nests_produced).sum();
    info!(
        "Finished {} generations, {} nests laid in total",
        reports.len(),
        nests
    );
    Ok(())
}
