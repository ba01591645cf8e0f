//! # Terrain Fill
//!
//! The first generation pass: every column gets a stone base, a grass layer and
//! a mulch layer whose thicknesses come from seeded fractal Perlin noise, and the
//! outer ring and floor are then sealed with containers.

use cgmath::Point3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::{
    config::{HeightLayer, NoiseSample, TerrainConfig},
    engine_state::voxels::{
        block::block_type::BlockType,
        world::{World, WorldError},
    },
};

/// Layer thresholds of a single column.
///
/// A voxel at height `y` is stone while `y <= stone_ceiling`, grass while
/// `y <= stone_ceiling + grass_height`, mulch while
/// `y <= stone_ceiling + grass_height + food_height`, and air above.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnProfile {
    /// Highest stone voxel.
    pub stone_ceiling: i32,
    /// Grass voxels above the stone.
    pub grass_height: i32,
    /// Mulch voxels above the grass.
    pub food_height: i32,
}

impl ColumnProfile {
    /// The block a column with this profile holds at height `y`, before the
    /// container shell is applied.
    pub fn block_at(&self, y: i32) -> BlockType {
        let grass_ceiling = self.stone_ceiling + self.grass_height;
        let food_ceiling = grass_ceiling + self.food_height;

        if y <= self.stone_ceiling {
            BlockType::Stone
        } else if y <= grass_ceiling {
            BlockType::Grass
        } else if y <= food_ceiling {
            BlockType::Mulch
        } else {
            BlockType::Air
        }
    }
}

/// Seeded coherent noise for the terrain layers.
pub struct TerrainNoise {
    fbm: Fbm<Perlin>,
}

impl TerrainNoise {
    /// Builds the fractal noise for `seed` with the configured octaves.
    pub fn new(seed: u32, config: &TerrainConfig) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(config.noise_octaves.max(1))
            .set_persistence(config.noise_persistence)
            .set_lacunarity(config.noise_lacunarity);
        TerrainNoise { fbm }
    }

    /// Whole-voxel thickness contributed by one noise term at column `(x, z)`.
    ///
    /// Noise is sampled at the voxel centre; integer lattice points are where
    /// Perlin noise is always zero.
    pub fn sample(&self, x: i32, z: i32, sample: &NoiseSample) -> i32 {
        let value = self.fbm.get([
            (x as f64 + 0.5) / sample.scale,
            sample.offset_y / sample.scale,
            (z as f64 + 0.5) / sample.scale,
        ]);
        let unit = ((value + 1.0) * 0.5).clamp(0.0, 1.0);

        let mut thickness = unit * sample.amplitude;
        if sample.exponent != 0.0 {
            thickness = thickness.powf(sample.exponent);
        }
        thickness as i32
    }

    /// The base plus every noise term of a layer.
    pub fn layer_height(&self, x: i32, z: i32, layer: &HeightLayer) -> i32 {
        layer.base
            + layer
                .samples
                .iter()
                .map(|sample| self.sample(x, z, sample))
                .sum::<i32>()
    }

    /// The layer thresholds of column `(x, z)`.
    pub fn column_profile(&self, x: i32, z: i32, config: &TerrainConfig) -> ColumnProfile {
        ColumnProfile {
            stone_ceiling: self.layer_height(x, z, &config.stone),
            grass_height: self.layer_height(x, z, &config.grass),
            food_height: self.layer_height(x, z, &config.food),
        }
    }
}

/// Whether `(x, y, z)` belongs to the container shell: the outer ring of columns
/// and the floor.
pub fn is_shell(world: &World, position: Point3<i32>) -> bool {
    position.x == 0
        || position.z == 0
        || position.x == world.size_x() - 1
        || position.z == world.size_z() - 1
        || position.y == 0
}

/// Fills column `(x, z)` bottom-up from `profile`, then overwrites its shell
/// voxels with containers.
pub fn fill_column(
    world: &mut World,
    x: i32,
    z: i32,
    profile: ColumnProfile,
) -> Result<(), WorldError> {
    for y in 0..world.height() {
        let position = Point3::new(x, y, z);
        let block_type = if is_shell(world, position) {
            BlockType::Container
        } else {
            profile.block_at(y)
        };
        world.set_block_at(position, block_type)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    fn world() -> World {
        World::with_chunks(Vector3::new(1, 2, 1), 8)
    }

    #[test]
    fn stone_only_column_is_stone_up_to_the_ceiling() {
        let mut world = world();
        let profile = ColumnProfile {
            stone_ceiling: 5,
            grass_height: 0,
            food_height: 0,
        };

        fill_column(&mut world, 3, 3, profile).unwrap();

        assert_eq!(world.get_block_at(Point3::new(3, 0, 3)), BlockType::Container);
        for y in 1..=5 {
            assert_eq!(world.get_block_at(Point3::new(3, y, 3)), BlockType::Stone);
        }
        for y in 6..world.height() {
            assert_eq!(world.get_block_at(Point3::new(3, y, 3)), BlockType::Air);
        }
        assert_eq!(world.surface_height(3, 3), Some(6));
    }

    #[test]
    fn layers_stack_in_order() {
        let profile = ColumnProfile {
            stone_ceiling: 2,
            grass_height: 2,
            food_height: 1,
        };
        let column: Vec<_> = (0..7).map(|y| profile.block_at(y)).collect();
        assert_eq!(
            column,
            vec![
                BlockType::Stone,
                BlockType::Stone,
                BlockType::Stone,
                BlockType::Grass,
                BlockType::Grass,
                BlockType::Mulch,
                BlockType::Air,
            ]
        );
    }

    #[test]
    fn shell_columns_are_all_container() {
        let mut world = world();
        let profile = ColumnProfile {
            stone_ceiling: 1,
            grass_height: 0,
            food_height: 0,
        };

        fill_column(&mut world, 0, 4, profile).unwrap();

        for y in 0..world.height() {
            assert_eq!(world.get_block_at(Point3::new(0, y, 4)), BlockType::Container);
        }
    }

    #[test]
    fn zero_amplitude_layers_collapse_to_their_base() {
        let noise = TerrainNoise::new(3, &TerrainConfig::default());
        let layer = HeightLayer {
            base: 4,
            samples: vec![NoiseSample {
                offset_y: 0.0,
                scale: 10.0,
                amplitude: 0.0,
                exponent: 0.0,
            }],
        };

        for x in 0..16 {
            assert_eq!(noise.layer_height(x, 7, &layer), 4);
        }
    }

    #[test]
    fn samples_stay_within_amplitude() {
        let noise = TerrainNoise::new(11, &TerrainConfig::default());
        let sample = NoiseSample {
            offset_y: 100.0,
            scale: 30.0,
            amplitude: 10.0,
            exponent: 0.0,
        };

        for x in 0..32 {
            for z in 0..32 {
                let thickness = noise.sample(x, z, &sample);
                assert!((0..=10).contains(&thickness));
            }
        }
    }
}
