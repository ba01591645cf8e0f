//! # Chunk Iteration Module
//!
//! This module provides an iterator over all non-air blocks of one chunk of the
//! world. It is what a mesher walks after it sees a chunk flagged for redraw.

use cgmath::Point3;

use crate::engine_state::voxels::{block::block_type::BlockType, world::World};

/// An iterator over all non-air blocks in a chunk.
///
/// Yields chunk-local positions together with the block type. The traversal
/// order is the storage order of the world grid: x fastest, then z, then y.
/// Voxels of a chunk that hang past the edge of the world are skipped.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the world being read
    world_ref: &'a World,
    /// World position of the chunk's (0, 0, 0) voxel
    origin: Point3<i32>,
    /// Side length of the chunk
    diameter: usize,
    /// Current X position within the chunk
    local_x: usize,
    /// Current Y position within the chunk
    local_y: usize,
    /// Current Z position within the chunk
    local_z: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the chunk at `chunk_position`
    /// (in chunk coordinates).
    pub fn new(world_ref: &'a World, chunk_position: Point3<i32>) -> Self {
        let diameter = world_ref.chunk_diameter();
        let side = diameter as i32;
        ChunkBlockIterator {
            world_ref,
            origin: Point3::new(
                chunk_position.x * side,
                chunk_position.y * side,
                chunk_position.z * side,
            ),
            diameter,
            local_x: 0,
            local_y: 0,
            local_z: 0,
        }
    }

    fn advance(&mut self) {
        self.local_x += 1;
        if self.local_x == self.diameter {
            self.local_x = 0;
            self.local_z += 1;
            if self.local_z == self.diameter {
                self.local_z = 0;
                self.local_y += 1;
            }
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        while self.local_y < self.diameter {
            let local = Point3::new(self.local_x, self.local_y, self.local_z);
            let world_position = Point3::new(
                self.origin.x + local.x as i32,
                self.origin.y + local.y as i32,
                self.origin.z + local.z as i32,
            );
            self.advance();

            let block_type = self.world_ref.get_block_at(world_position);
            if block_type.is_solid() {
                return Some((local, block_type));
            }
        }
        None
    }
}
