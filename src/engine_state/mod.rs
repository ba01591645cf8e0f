//! # Engine State Module
//!
//! The core module that owns a running colony simulation.
//!
//! ## Key Components
//!
//! * `EngineState` - The world, colony and counters of the current generation
//! * `agents` - Colony members and their decision engine
//! * `scheduler` - The turn loop, generations and presentation hook
//! * `telemetry` - Data reported after every turn and generation
//! * `voxels` - The voxel world, its chunks and world generation
//!
//! ## Architecture
//!
//! `EngineState` is the single writer of the simulation. A generation is
//! created from the configuration and a seed (world generation, then
//! spawning), lives for as long as its queen does, and is then replaced by the
//! next one. Everything random draws from one RNG seeded per generation, so a
//! run is reproducible from its configuration alone.

use log::info;
use thiserror::Error;

use crate::config::{ConfigError, SimulationConfig};

use agents::colony::{Colony, SpawnError};
use telemetry::Telemetry;
use voxels::{
    generation::{GenerationSummary, WorldGenerator},
    world::{World, WorldError},
};

pub mod agents;
pub mod scheduler;
pub mod telemetry;
pub mod voxels;

/// Errors raised while creating a generation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// World generation failed.
    #[error("world generation failed: {0}")]
    World(#[from] WorldError),
    /// The colony could not be placed.
    #[error("spawning failed: {0}")]
    Spawn(#[from] SpawnError),
}

/// The seed a generation runs with: the configured seed advanced by the
/// generation index, so generation 1 uses the configured seed unchanged.
pub fn generation_seed(seed: u64, generation: u32) -> u64 {
    seed.wrapping_add(u64::from(generation.saturating_sub(1)))
}

/// The state of a running simulation.
pub struct EngineState {
    /// Validated configuration every generation is created from
    config: SimulationConfig,
    /// The voxel world of the current generation
    pub world: World,
    /// The agents of the current generation
    pub colony: Colony,
    /// Source of every random draw in the current generation
    rng: fastrand::Rng,
    /// Current generation, starting at 1
    generation: u32,
    /// Turns played in the current generation
    turn: u64,
}

impl EngineState {
    /// Validates `config` and creates the first generation.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the configuration is invalid, or if the
    /// world cannot be generated or populated.
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let (world, colony, rng, _) = Self::create_generation(&config, 1)?;
        Ok(Self {
            config,
            world,
            colony,
            rng,
            generation: 1,
            turn: 0,
        })
    }

    /// Wraps an already built world and colony as generation 1.
    ///
    /// The configuration is not validated, so hand-built scenarios may use
    /// constants a configuration file could not.
    ///
    /// # Arguments
    ///
    /// * `config` - Used for later generations
    /// * `world` - The terrain the colony stands on
    /// * `colony` - The agents, already placed
    /// * `seed` - Seed of the RNG the agents draw from
    pub fn from_parts(config: SimulationConfig, world: World, colony: Colony, seed: u64) -> Self {
        Self {
            config,
            world,
            colony,
            rng: fastrand::Rng::with_seed(seed),
            generation: 1,
            turn: 0,
        }
    }

    fn create_generation(
        config: &SimulationConfig,
        generation: u32,
    ) -> Result<(World, Colony, fastrand::Rng, GenerationSummary), EngineError> {
        let seed = generation_seed(config.seed, generation);
        let mut rng = fastrand::Rng::with_seed(seed);

        let (world, summary) = WorldGenerator::new(config).generate(seed, &mut rng)?;
        let colony = Colony::spawn(config, &world, &mut rng)?;

        info!(
            "Generation {} created from seed {} with {} agents",
            generation,
            seed,
            colony.size()
        );
        Ok((world, colony, rng, summary))
    }

    /// Replaces the world and colony with the next generation and resets the
    /// turn counter.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the new world cannot be generated or
    /// populated; the current generation is left in place.
    pub fn next_generation(&mut self) -> Result<GenerationSummary, EngineError> {
        let generation = self.generation + 1;
        let (world, colony, rng, summary) = Self::create_generation(&self.config, generation)?;

        self.world = world;
        self.colony = colony;
        self.rng = rng;
        self.generation = generation;
        self.turn = 0;
        Ok(summary)
    }

    /// The configuration generations are created from.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current generation, starting at 1.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Turns played in the current generation.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Whether the current generation has ended.
    pub fn is_generation_over(&self) -> bool {
        !self.colony.queen().is_alive()
    }

    /// Colony-wide counters right now.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            generation: self.generation,
            turn: self.turn,
            nests_produced: self.colony.nests_produced(),
            colony_size: self.colony.size(),
            queen_health: self.colony.queen().health(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            seed: 77,
            world: WorldConfig {
                world_diameter: 2,
                world_height: 4,
                chunk_diameter: 8,
            },
            initial_population: 10,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn new_state_starts_at_generation_one() {
        let state = EngineState::new(small_config()).unwrap();
        let telemetry = state.telemetry();

        assert_eq!(telemetry.generation, 1);
        assert_eq!(telemetry.turn, 0);
        assert_eq!(telemetry.colony_size, 11);
        assert_eq!(telemetry.queen_health, 500);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = SimulationConfig {
            initial_population: 10_000,
            ..small_config()
        };
        assert!(matches!(EngineState::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn next_generation_reseeds_and_resets_the_turn() {
        let mut state = EngineState::new(small_config()).unwrap();
        let first = state.world.as_bytes().to_vec();
        state.turn = 12;

        state.next_generation().unwrap();

        assert_eq!(state.generation(), 2);
        assert_eq!(state.turn(), 0);
        assert_ne!(state.world.as_bytes(), first.as_slice());
    }

    #[test]
    fn generation_seed_advances_by_index() {
        assert_eq!(generation_seed(10, 1), 10);
        assert_eq!(generation_seed(10, 3), 12);
        assert_eq!(generation_seed(u64::MAX, 2), 0);
    }
}
