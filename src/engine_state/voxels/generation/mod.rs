//! # World Generation
//!
//! One-shot procedural fill of a [`World`]. Generation is deterministic for a
//! given seed and configuration, and runs three passes over the same grid:
//!
//! 1. **Terrain** - noise-driven stone, grass and mulch layers per column, sealed
//!    in a container bowl (see [`terrain`]).
//! 2. **Acidic regions** - spheres centred on the surface of random columns that
//!    fill the air above the terrain with acid.
//! 3. **Container obstacles** - spheres centred anywhere inside the world that
//!    overwrite whatever is there with containers.

use cgmath::Point3;
use log::info;
use web_time::{Duration, Instant};

use crate::config::SimulationConfig;

use super::{
    block::block_type::BlockType,
    world::{World, WorldError},
};

pub mod spheres;
pub mod terrain;

use spheres::{stamp_sphere, SphereFill};
use terrain::{fill_column, TerrainNoise};

/// What a generation run produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GenerationSummary {
    /// Air voxels turned into acid.
    pub acid_voxels: usize,
    /// Voxels overwritten by container spheres.
    pub container_voxels: usize,
    /// Wall-clock time spent generating.
    pub elapsed: Duration,
}

/// Derives the 32-bit noise seed from the simulation seed.
pub fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Procedural generator for the colony world.
pub struct WorldGenerator<'a> {
    config: &'a SimulationConfig,
}

impl<'a> WorldGenerator<'a> {
    /// Creates a generator for the given configuration.
    pub fn new(config: &'a SimulationConfig) -> Self {
        WorldGenerator { config }
    }

    /// Builds a new world for `seed`.
    ///
    /// The noise is seeded from `seed`; sphere placement draws from `rng`, which
    /// the caller seeds and then keeps using for the colony so the whole
    /// generation is reproducible from one seed.
    pub fn generate(
        &self,
        seed: u64,
        rng: &mut fastrand::Rng,
    ) -> Result<(World, GenerationSummary), WorldError> {
        let start = Instant::now();
        let mut world = World::new(&self.config.world);

        self.generate_terrain(&mut world, &TerrainNoise::new(noise_seed(seed), &self.config.terrain))?;
        let acid_voxels = self.generate_acidic_regions(&mut world, rng)?;
        let container_voxels = self.generate_container_spheres(&mut world, rng)?;
        world.mark_all_dirty();

        let summary = GenerationSummary {
            acid_voxels,
            container_voxels,
            elapsed: start.elapsed(),
        };
        info!(
            "Generated {}x{}x{} world in {:?} ({} acid, {} container voxels stamped)",
            world.size_x(),
            world.height(),
            world.size_z(),
            summary.elapsed,
            acid_voxels,
            container_voxels
        );
        Ok((world, summary))
    }

    /// Fills every column from the terrain noise and seals the shell.
    pub fn generate_terrain(&self, world: &mut World, noise: &TerrainNoise) -> Result<(), WorldError> {
        for x in 0..world.size_x() {
            for z in 0..world.size_z() {
                let profile = noise.column_profile(x, z, &self.config.terrain);
                fill_column(world, x, z, profile)?;
            }
        }
        Ok(())
    }

    /// Stamps the acid spheres. Returns the number of voxels turned into acid.
    pub fn generate_acidic_regions(
        &self,
        world: &mut World,
        rng: &mut fastrand::Rng,
    ) -> Result<usize, WorldError> {
        let hazards = &self.config.hazards;
        let mut stamped = 0;

        for _ in 0..hazards.number_of_acidic_regions {
            let (x, z) = random_interior_column(world, rng);
            let Some(y) = world.top_solid_y(x, z) else {
                continue;
            };
            stamped += stamp_sphere(
                world,
                Point3::new(x, y, z),
                hazards.acidic_region_radius,
                BlockType::Acid,
                SphereFill::AirOnly,
            )?;
        }

        Ok(stamped)
    }

    /// Stamps the container obstacles. Returns the number of voxels overwritten.
    pub fn generate_container_spheres(
        &self,
        world: &mut World,
        rng: &mut fastrand::Rng,
    ) -> Result<usize, WorldError> {
        let hazards = &self.config.hazards;
        let mut stamped = 0;

        for _ in 0..hazards.number_of_container_spheres {
            let (x, z) = random_interior_column(world, rng);
            let y = rng.i32(1..(world.height() - 1).max(2));
            stamped += stamp_sphere(
                world,
                Point3::new(x, y, z),
                hazards.container_sphere_radius,
                BlockType::Container,
                SphereFill::Overwrite,
            )?;
        }

        Ok(stamped)
    }
}

/// A uniformly random column strictly inside the container shell.
pub fn random_interior_column(world: &World, rng: &mut fastrand::Rng) -> (i32, i32) {
    let x = rng.i32(1..(world.size_x() - 1).max(2));
    let z = rng.i32(1..(world.size_z() - 1).max(2));
    (x, z)
}
