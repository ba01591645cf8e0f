//! # Simulation Configuration
//!
//! The read-only bundle of numeric constants the simulation core runs on.
//! Every field has a default, so a configuration file only needs to name the
//! values it changes. Loading from disk lives in the front end
//! (`application_state::config_loader`); the core only ever borrows a
//! validated `SimulationConfig`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::voxels::block::block_type::BlockType;

/// Largest `max_health` a role may declare.
pub const MAX_HEALTH_LIMIT: i32 = 1_000_000;

/// Largest number of voxels a world may hold.
pub const MAX_WORLD_VOXELS: usize = 1 << 26;

/// Errors reported by [`SimulationConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A world dimension was zero.
    #[error("world dimension `{0}` must be greater than zero")]
    ZeroDimension(&'static str),
    /// The world is too small to have any interior column.
    #[error("world must be at least 3 voxels wide to have an interior, got {0}")]
    NoInterior(usize),
    /// More agents were requested than there are interior columns to spawn on.
    #[error("{agents} agents cannot spawn on {columns} interior columns")]
    PopulationTooLarge {
        /// Queen plus workers.
        agents: usize,
        /// Interior columns available.
        columns: usize,
    },
    /// A role constant is out of range.
    #[error("{role} role: {reason}")]
    InvalidRole {
        /// `worker` or `queen`.
        role: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The world holds more voxels than [`MAX_WORLD_VOXELS`].
    #[error("world of {diameter}x{height}x{diameter} chunks of {chunk} voxels is too large")]
    WorldTooLarge {
        /// Chunks along X and Z.
        diameter: usize,
        /// Chunks along Y.
        height: usize,
        /// Voxels per chunk side.
        chunk: usize,
    },
    /// A hazard sphere radius is negative or wider than the world.
    #[error("{hazard} radius {radius} must be within 0..={max}")]
    InvalidHazardRadius {
        /// `acidic_region` or `container_sphere`.
        hazard: &'static str,
        /// The offending radius.
        radius: i32,
        /// The world's voxel diameter.
        max: usize,
    },
    /// A noise sample has a non-positive scale.
    #[error("terrain layer `{layer}` has a sample with non-positive scale {scale}")]
    InvalidNoiseScale {
        /// `stone`, `grass` or `food`.
        layer: &'static str,
        /// The offending scale.
        scale: f64,
    },
}

/// Chunk and world dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of chunks along X and along Z.
    pub world_diameter: usize,
    /// Number of chunks along Y.
    pub world_height: usize,
    /// Side length of a chunk in voxels.
    pub chunk_diameter: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_diameter: 16,
            world_height: 4,
            chunk_diameter: 8,
        }
    }
}

impl WorldConfig {
    /// Voxels along X and along Z.
    pub fn voxel_diameter(&self) -> usize {
        self.world_diameter * self.chunk_diameter
    }

    /// Voxels along Y.
    pub fn voxel_height(&self) -> usize {
        self.world_height * self.chunk_diameter
    }

    /// Total voxels in the world, or `None` if the count overflows.
    pub fn voxel_count(&self) -> Option<usize> {
        let diameter = self.world_diameter.checked_mul(self.chunk_diameter)?;
        let height = self.world_height.checked_mul(self.chunk_diameter)?;
        diameter.checked_mul(diameter)?.checked_mul(height)
    }

    /// Number of columns an agent can spawn on (everything inside the shell).
    pub fn interior_columns(&self) -> usize {
        let inner = self.voxel_diameter().saturating_sub(2);
        inner * inner
    }
}

/// One coherent-noise term of a terrain layer.
///
/// The sample for column `(x, z)` is the fractal noise at
/// `(x / scale, offset_y / scale, z / scale)` remapped to `[0, 1]`, multiplied
/// by `amplitude` and raised to `exponent` (unless the exponent is zero), then
/// truncated to whole voxels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NoiseSample {
    /// Fixed Y coordinate of the sampling plane; keeps the layers independent.
    pub offset_y: f64,
    /// Horizontal feature size in voxels.
    pub scale: f64,
    /// Maximum thickness contributed before the exponent.
    pub amplitude: f64,
    /// Shaping exponent; `0.0` leaves the sample linear.
    pub exponent: f64,
}

/// A terrain layer thickness: a constant plus noise terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct HeightLayer {
    /// Constant thickness added to every column.
    pub base: i32,
    /// Noise terms summed on top of the base.
    pub samples: Vec<NoiseSample>,
}

/// Terrain noise parameters.
///
/// The defaults are the hand-tuned values the colony world has always been
/// generated with; changing them produces very different landscapes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Octaves of the fractal noise.
    pub noise_octaves: usize,
    /// Amplitude falloff between octaves.
    pub noise_persistence: f64,
    /// Frequency growth between octaves.
    pub noise_lacunarity: f64,
    /// Highest stone voxel of a column.
    pub stone: HeightLayer,
    /// Grass thickness above the stone.
    pub grass: HeightLayer,
    /// Mulch thickness above the grass.
    pub food: HeightLayer,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            noise_octaves: 1,
            noise_persistence: 0.5,
            noise_lacunarity: 2.0,
            stone: HeightLayer {
                base: 10,
                samples: vec![
                    NoiseSample { offset_y: 0.0, scale: 10.0, amplitude: 3.0, exponent: 1.2 },
                    NoiseSample { offset_y: 300.0, scale: 20.0, amplitude: 4.0, exponent: 0.0 },
                ],
            },
            grass: HeightLayer {
                base: 0,
                samples: vec![NoiseSample {
                    offset_y: 100.0,
                    scale: 30.0,
                    amplitude: 10.0,
                    exponent: 0.0,
                }],
            },
            food: HeightLayer {
                base: 0,
                samples: vec![NoiseSample {
                    offset_y: 200.0,
                    scale: 20.0,
                    amplitude: 5.0,
                    exponent: 1.5,
                }],
            },
        }
    }
}

/// Acid pools and container obstacles stamped after the terrain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HazardConfig {
    /// Number of acid spheres centred on the surface.
    pub number_of_acidic_regions: usize,
    /// Radius of each acid sphere.
    pub acidic_region_radius: i32,
    /// Number of container spheres centred anywhere inside the world.
    pub number_of_container_spheres: usize,
    /// Radius of each container sphere.
    pub container_sphere_radius: i32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            number_of_acidic_regions: 10,
            acidic_region_radius: 5,
            number_of_container_spheres: 5,
            container_sphere_radius: 4,
        }
    }
}

/// Per-role constants shared by the decision engine.
///
/// A role section in a configuration file must be complete; a missing section
/// falls back to [`RoleConfig::worker`] or [`RoleConfig::queen`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoleConfig {
    /// Health at spawn, before jitter.
    pub initial_health: i32,
    /// Up to this much is subtracted at random from the initial health.
    pub initial_health_jitter: i32,
    /// Health ceiling.
    pub max_health: i32,
    /// Health lost at the end of every turn (doubled on acid).
    pub turn_damage: i32,
    /// Health restored by digging a mulch block.
    pub mulch_health_recovery: i32,
    /// Turns between nests; only the queen has one.
    pub nest_interval: Option<u64>,
    /// Turns of random wandering after donating health.
    pub cooldown_duration: u32,
    /// Inclusive bounds of a single health donation.
    pub health_donation_range: [i32; 2],
    /// Chance of digging a mulch block in place instead of moving.
    pub dig_probability: f64,
    /// Block placed under the agent when it climbs.
    pub climb_block: BlockType,
}

impl RoleConfig {
    /// Constants of a worker ant.
    pub fn worker() -> Self {
        Self {
            initial_health: 250,
            initial_health_jitter: 20,
            max_health: 350,
            turn_damage: 5,
            mulch_health_recovery: 30,
            nest_interval: None,
            cooldown_duration: 20,
            health_donation_range: [50, 100],
            dig_probability: 0.4,
            climb_block: BlockType::Mulch,
        }
    }

    /// Constants of the queen.
    pub fn queen() -> Self {
        Self {
            initial_health: 500,
            initial_health_jitter: 0,
            max_health: 700,
            turn_damage: 6,
            mulch_health_recovery: 40,
            nest_interval: Some(75),
            cooldown_duration: 20,
            health_donation_range: [50, 100],
            dig_probability: 0.2,
            climb_block: BlockType::Stone,
        }
    }

    fn validate(&self, role: &'static str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRole { role, reason };

        if self.max_health <= 0 || self.max_health > MAX_HEALTH_LIMIT {
            return Err(invalid(format!(
                "max_health {} must be within 1..={MAX_HEALTH_LIMIT}",
                self.max_health
            )));
        }
        if self.initial_health <= 0 || self.initial_health > self.max_health {
            return Err(invalid(format!(
                "initial_health {} must be within 1..={}",
                self.initial_health, self.max_health
            )));
        }
        if self.initial_health_jitter < 0 || self.initial_health_jitter >= self.initial_health {
            return Err(invalid(format!(
                "initial_health_jitter {} must be within 0..{}",
                self.initial_health_jitter, self.initial_health
            )));
        }
        // A generation only ends once every agent has bled out.
        if self.turn_damage <= 0 || self.turn_damage > self.max_health {
            return Err(invalid(format!(
                "turn_damage {} must be within 1..={}",
                self.turn_damage, self.max_health
            )));
        }
        if self.mulch_health_recovery < 0 || self.mulch_health_recovery > self.max_health {
            return Err(invalid(format!(
                "mulch_health_recovery {} must be within 0..={}",
                self.mulch_health_recovery, self.max_health
            )));
        }
        if self.nest_interval == Some(0) {
            return Err(invalid("nest_interval must be at least 1".into()));
        }
        let [low, high] = self.health_donation_range;
        if low < 0 || low > high || high > self.max_health {
            return Err(invalid(format!(
                "health_donation_range [{low}, {high}] must lie within 0..={}",
                self.max_health
            )));
        }
        if !(0.0..=1.0).contains(&self.dig_probability) {
            return Err(invalid(format!(
                "dig_probability {} must be within [0, 1]",
                self.dig_probability
            )));
        }
        if !self.climb_block.is_solid() {
            return Err(invalid("climb_block must be solid".into()));
        }
        Ok(())
    }
}

/// The complete configuration bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for both the terrain noise and every random draw.
    pub seed: u64,
    /// Grid dimensions.
    pub world: WorldConfig,
    /// Terrain noise layers.
    pub terrain: TerrainConfig,
    /// Acid and container spheres.
    pub hazards: HazardConfig,
    /// Workers spawned at the start of each generation.
    pub initial_population: usize,
    /// Worker constants.
    pub worker: RoleConfig,
    /// Queen constants.
    pub queen: RoleConfig,
    /// Generations the scheduler runs before stopping.
    pub generations: u32,
    /// Presentation delay between turns, in milliseconds.
    pub turn_pacing_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            world: WorldConfig::default(),
            terrain: TerrainConfig::default(),
            hazards: HazardConfig::default(),
            initial_population: 50,
            worker: RoleConfig::worker(),
            queen: RoleConfig::queen(),
            generations: 1,
            turn_pacing_ms: 1000,
        }
    }
}

impl SimulationConfig {
    /// Parses a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks the bundle for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.world_diameter == 0 {
            return Err(ConfigError::ZeroDimension("world_diameter"));
        }
        if self.world.world_height == 0 {
            return Err(ConfigError::ZeroDimension("world_height"));
        }
        if self.world.chunk_diameter == 0 {
            return Err(ConfigError::ZeroDimension("chunk_diameter"));
        }
        if !self
            .world
            .voxel_count()
            .is_some_and(|voxels| voxels <= MAX_WORLD_VOXELS)
        {
            return Err(ConfigError::WorldTooLarge {
                diameter: self.world.world_diameter,
                height: self.world.world_height,
                chunk: self.world.chunk_diameter,
            });
        }
        if self.world.voxel_diameter() < 3 {
            return Err(ConfigError::NoInterior(self.world.voxel_diameter()));
        }

        let agents = self.initial_population + 1;
        let columns = self.world.interior_columns();
        if agents > columns {
            return Err(ConfigError::PopulationTooLarge { agents, columns });
        }

        let max = self.world.voxel_diameter();
        for (hazard, radius) in [
            ("acidic_region", self.hazards.acidic_region_radius),
            ("container_sphere", self.hazards.container_sphere_radius),
        ] {
            if usize::try_from(radius).map_or(true, |radius| radius > max) {
                return Err(ConfigError::InvalidHazardRadius { hazard, radius, max });
            }
        }

        for (layer, height_layer) in [
            ("stone", &self.terrain.stone),
            ("grass", &self.terrain.grass),
            ("food", &self.terrain.food),
        ] {
            if let Some(sample) = height_layer.samples.iter().find(|s| s.scale <= 0.0) {
                return Err(ConfigError::InvalidNoiseScale {
                    layer,
                    scale: sample.scale,
                });
            }
        }

        self.worker.validate("worker")?;
        self.queen.validate("queen")?;
        Ok(())
    }
}
