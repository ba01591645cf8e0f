//! # Sphere Stamping
//!
//! Acid pools and container obstacles are both stamped as discrete spheres. The
//! bounding cube of the sphere is walked and every voxel within the radius is
//! written, with coordinates clamped one voxel inside the container shell so a
//! sphere never breaches the world boundary.

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::block_type::BlockType,
    world::{World, WorldError},
};

/// How a sphere treats the blocks already in place.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SphereFill {
    /// Only air voxels are replaced.
    AirOnly,
    /// Every voxel is replaced.
    Overwrite,
}

/// Stamps a sphere of `block_type` around `center`.
///
/// A voxel is inside when `dx² + dy² + dz² <= radius²`. Coordinates are clamped
/// to `[1, dim - 2]` on every axis. Returns the number of voxels that changed.
pub fn stamp_sphere(
    world: &mut World,
    center: Point3<i32>,
    radius: i32,
    block_type: BlockType,
    fill: SphereFill,
) -> Result<usize, WorldError> {
    if radius < 0 || world.size_x() < 3 || world.height() < 3 || world.size_z() < 3 {
        return Ok(0);
    }

    let mut changed = 0;
    let radius_squared = i64::from(radius).pow(2);

    for dy in -radius..=radius {
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let distance_squared =
                    i64::from(dx).pow(2) + i64::from(dy).pow(2) + i64::from(dz).pow(2);
                if distance_squared > radius_squared {
                    continue;
                }

                let position = Point3::new(
                    (center.x + dx).clamp(1, world.size_x() - 2),
                    (center.y + dy).clamp(1, world.height() - 2),
                    (center.z + dz).clamp(1, world.size_z() - 2),
                );
                let current = world.get_block_at(position);
                if current == block_type {
                    continue;
                }
                if fill == SphereFill::AirOnly && current != BlockType::Air {
                    continue;
                }

                world.set_block_at(position, block_type)?;
                changed += 1;
            }
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    fn world() -> World {
        World::with_chunks(Vector3::new(2, 2, 2), 8)
    }

    #[test]
    fn radius_zero_is_a_single_voxel() {
        let mut world = world();
        let changed = stamp_sphere(
            &mut world,
            Point3::new(5, 5, 5),
            0,
            BlockType::Acid,
            SphereFill::AirOnly,
        )
        .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(world.count_blocks(BlockType::Acid), 1);
    }

    #[test]
    fn radius_one_is_a_cross() {
        let mut world = world();
        let changed = stamp_sphere(
            &mut world,
            Point3::new(5, 5, 5),
            1,
            BlockType::Container,
            SphereFill::Overwrite,
        )
        .unwrap();

        assert_eq!(changed, 7);
        assert_eq!(world.get_block_at(Point3::new(6, 5, 5)), BlockType::Container);
        assert_eq!(world.get_block_at(Point3::new(6, 6, 5)), BlockType::Air);
    }

    #[test]
    fn air_only_spheres_keep_solid_terrain() {
        let mut world = world();
        world.set_block_at(Point3::new(5, 5, 5), BlockType::Stone).unwrap();

        stamp_sphere(&mut world, Point3::new(5, 5, 5), 2, BlockType::Acid, SphereFill::AirOnly)
            .unwrap();

        assert_eq!(world.get_block_at(Point3::new(5, 5, 5)), BlockType::Stone);
        assert_eq!(world.get_block_at(Point3::new(5, 6, 5)), BlockType::Acid);
    }

    #[test]
    fn overwrite_spheres_replace_solid_terrain() {
        let mut world = world();
        world.set_block_at(Point3::new(5, 5, 5), BlockType::Mulch).unwrap();

        stamp_sphere(&mut world, Point3::new(5, 5, 5), 2, BlockType::Container, SphereFill::Overwrite)
            .unwrap();

        assert_eq!(world.get_block_at(Point3::new(5, 5, 5)), BlockType::Container);
    }

    #[test]
    fn a_world_sized_radius_fills_the_interior() {
        let mut world = world();
        let radius = world.size_x();

        let changed = stamp_sphere(
            &mut world,
            Point3::new(8, 8, 8),
            radius,
            BlockType::Acid,
            SphereFill::AirOnly,
        )
        .unwrap();

        assert_eq!(changed, 14 * 14 * 14);
        assert_eq!(world.count_blocks(BlockType::Acid), changed);
    }

    #[test]
    fn spheres_stay_inside_the_shell() {
        let mut world = world();
        stamp_sphere(&mut world, Point3::new(0, 0, 0), 4, BlockType::Acid, SphereFill::AirOnly)
            .unwrap();

        for y in 0..world.height() {
            for z in 0..world.size_z() {
                for x in 0..world.size_x() {
                    let on_shell = x == 0
                        || z == 0
                        || y == 0
                        || x == world.size_x() - 1
                        || z == world.size_z() - 1
                        || y == world.height() - 1;
                    if on_shell {
                        assert_eq!(world.get_block_at(Point3::new(x, y, z)), BlockType::Air);
                    }
                }
            }
        }
        assert!(world.count_blocks(BlockType::Acid) > 0);
    }
}
