//! # World Module
//!
//! This module provides the `World` struct, the dense block grid the colony lives
//! in, and its redraw bookkeeping.
//!
//! ## Architecture
//!
//! Unlike a streaming voxel engine, the colony world is finite and fully
//! resident: every voxel of `size_x * height * size_z` is stored in one flat
//! vector. Chunks exist only to batch "needs redraw" signaling for an external
//! renderer (see [`ChunkGrid`]).
//!
//! ## Bounds
//!
//! - Reads outside the grid return [`BlockType::Air`]; there is no error path.
//! - Writes outside the grid are rejected with [`WorldError::OutOfBounds`] and
//!   logged, without touching the grid.
//! - [`World::set_block_at`] is the only mutator.

use cgmath::{Point3, Vector3};
use thiserror::Error;

use crate::config::WorldConfig;

use super::block::{block_type::BlockType, Block};
use super::chunk::{chunk_iteration::ChunkBlockIterator, Chunk, ChunkGrid};

/// Errors produced by world mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The write targeted a voxel outside the grid.
    #[error("attempted to set block {block_type:?} at {position:?}, outside the world")]
    OutOfBounds {
        /// The rejected position.
        position: Point3<i32>,
        /// The block that was not written.
        block_type: BlockType,
    },
}

/// The voxel world: a dense, finite grid of blocks partitioned into chunks.
pub struct World {
    /// Voxels along each axis.
    dimensions: Vector3<usize>,
    /// Side length of a chunk in voxels.
    chunk_diameter: usize,
    /// Every voxel, in row-major order (x, then z, then y).
    blocks: Vec<Block>,
    /// Redraw flags, one per chunk.
    chunks: ChunkGrid,
}

impl World {
    /// Creates a world of the configured size filled with air.
    pub fn new(config: &WorldConfig) -> Self {
        Self::with_chunks(
            Vector3::new(config.world_diameter, config.world_height, config.world_diameter),
            config.chunk_diameter,
        )
    }

    /// Creates an air-filled world of `chunk_counts` chunks per axis, each
    /// `chunk_diameter` voxels wide.
    pub fn with_chunks(chunk_counts: Vector3<usize>, chunk_diameter: usize) -> Self {
        let dimensions = chunk_counts * chunk_diameter;
        World {
            dimensions,
            chunk_diameter,
            blocks: vec![Block::default(); dimensions.x * dimensions.y * dimensions.z],
            chunks: ChunkGrid::new(chunk_counts),
        }
    }

    /// Voxels along X.
    pub fn size_x(&self) -> i32 {
        self.dimensions.x as i32
    }

    /// Voxels along Y.
    pub fn height(&self) -> i32 {
        self.dimensions.y as i32
    }

    /// Voxels along Z.
    pub fn size_z(&self) -> i32 {
        self.dimensions.z as i32
    }

    /// Side length of a chunk in voxels.
    pub fn chunk_diameter(&self) -> usize {
        self.chunk_diameter
    }

    /// Whether `position` lies inside the grid.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.index(position).is_some()
    }

    /// Whether the column `(x, z)` lies strictly inside the container shell.
    pub fn is_interior_column(&self, x: i32, z: i32) -> bool {
        x > 0 && z > 0 && x < self.size_x() - 1 && z < self.size_z() - 1
    }

    fn index(&self, position: Point3<i32>) -> Option<usize> {
        if position.x < 0 || position.y < 0 || position.z < 0 {
            return None;
        }
        let (x, y, z) = (position.x as usize, position.y as usize, position.z as usize);
        if x >= self.dimensions.x || y >= self.dimensions.y || z >= self.dimensions.z {
            return None;
        }
        Some(x + self.dimensions.x * (z + self.dimensions.z * y))
    }

    /// Returns the block type at `position`, or `Air` outside the grid.
    pub fn get_block_at(&self, position: Point3<i32>) -> BlockType {
        self.index(position)
            .map(|index| self.blocks[index].block_type())
            .unwrap_or(BlockType::Air)
    }

    /// Stores `block_type` at `position` and flags the owning chunk and its
    /// face-adjacent neighbors for redraw.
    ///
    /// # Errors
    /// Returns [`WorldError::OutOfBounds`] (and logs a warning) if any coordinate
    /// is outside the grid. The grid is left untouched.
    pub fn set_block_at(
        &mut self,
        position: Point3<i32>,
        block_type: BlockType,
    ) -> Result<(), WorldError> {
        let Some(index) = self.index(position) else {
            log::warn!("Attempted to set {block_type:?} at {position:?}, which is outside the world");
            return Err(WorldError::OutOfBounds {
                position,
                block_type,
            });
        };

        self.blocks[index] = Block::new(block_type);
        let chunk_position = self.chunk_position_of(position);
        self.chunks.mark_with_neighbors(chunk_position);
        Ok(())
    }

    /// The y-coordinate of the topmost non-air voxel of column `(x, z)`.
    ///
    /// Returns `None` if the column is all air or outside the grid.
    pub fn top_solid_y(&self, x: i32, z: i32) -> Option<i32> {
        if !self.contains(Point3::new(x, 0, z)) {
            return None;
        }
        (0..self.height())
            .rev()
            .find(|&y| self.get_block_at(Point3::new(x, y, z)).is_solid())
    }

    /// The y-coordinate an agent standing on column `(x, z)` occupies: one above
    /// the topmost non-air voxel.
    ///
    /// Returns `None` if the column is all air or outside the grid. After
    /// generation every column has at least its container floor, but callers must
    /// still handle the empty case.
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        self.top_solid_y(x, z).map(|y| y + 1)
    }

    /// Counts the voxels of one block type.
    pub fn count_blocks(&self, block_type: BlockType) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.block_type() == block_type)
            .count()
    }

    /// The raw grid as bytes, one per voxel in storage order, for bulk upload to
    /// a renderer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// The chunk containing a block position.
    pub fn chunk_position_of(&self, position: Point3<i32>) -> Point3<i32> {
        let side = self.chunk_diameter as i32;
        Point3::new(
            position.x.div_euclid(side),
            position.y.div_euclid(side),
            position.z.div_euclid(side),
        )
    }

    /// Whether the chunk at `chunk_position` needs to be redrawn.
    pub fn chunk_needs_redraw(&self, chunk_position: Point3<i32>) -> bool {
        self.chunks.is_dirty(chunk_position)
    }

    /// Positions of every chunk that needs to be redrawn.
    pub fn dirty_chunks(&self) -> Vec<Point3<i32>> {
        self.chunks.dirty_positions()
    }

    /// Clears the redraw flag of one chunk. Called by the renderer once it has
    /// rebuilt the chunk's surface.
    pub fn clear_redraw(&mut self, chunk_position: Point3<i32>) {
        self.chunks.clear(chunk_position);
    }

    /// Returns every chunk that needs to be redrawn and clears their flags.
    pub fn take_dirty_chunks(&mut self) -> Vec<Point3<i32>> {
        self.chunks.take_dirty()
    }

    /// Flags every chunk, e.g. after the world was regenerated.
    pub fn mark_all_dirty(&mut self) {
        self.chunks.mark_all();
    }

    /// Every chunk of the world with its redraw flag.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        self.chunks.chunks()
    }

    /// Iterates over the non-air blocks of one chunk.
    pub fn chunk_blocks(&self, chunk_position: Point3<i32>) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self, chunk_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> World {
        World::with_chunks(Vector3::new(2, 2, 2), 4)
    }

    #[test]
    fn out_of_bounds_reads_are_air() {
        let mut world = small_world();
        world.set_block_at(Point3::new(0, 0, 0), BlockType::Stone).unwrap();

        assert_eq!(world.get_block_at(Point3::new(0, 0, 0)), BlockType::Stone);
        assert_eq!(world.get_block_at(Point3::new(-1, 0, 0)), BlockType::Air);
        assert_eq!(world.get_block_at(Point3::new(0, 8, 0)), BlockType::Air);
        assert_eq!(world.get_block_at(Point3::new(0, 0, 100)), BlockType::Air);
    }

    #[test]
    fn out_of_bounds_writes_are_rejected_without_mutation() {
        let mut world = small_world();
        world.take_dirty_chunks();
        let before = world.as_bytes().to_vec();

        let result = world.set_block_at(Point3::new(8, 0, 0), BlockType::Stone);

        assert_eq!(
            result,
            Err(WorldError::OutOfBounds {
                position: Point3::new(8, 0, 0),
                block_type: BlockType::Stone,
            })
        );
        assert_eq!(world.as_bytes(), before.as_slice());
        assert!(world.dirty_chunks().is_empty());
    }

    #[test]
    fn set_marks_owning_chunk_and_neighbors() {
        let mut world = small_world();
        world.take_dirty_chunks();

        world.set_block_at(Point3::new(5, 1, 2), BlockType::Mulch).unwrap();

        let mut dirty = world.dirty_chunks();
        dirty.sort_by_key(|p| (p.x, p.y, p.z));
        assert_eq!(
            dirty,
            vec![
                Point3::new(0, 0, 0),
                Point3::new(1, 0, 0),
                Point3::new(1, 0, 1),
                Point3::new(1, 1, 0),
            ]
        );
    }

    #[test]
    fn surface_height_is_one_above_top_solid_voxel() {
        let mut world = small_world();
        assert_eq!(world.surface_height(2, 2), None);

        world.set_block_at(Point3::new(2, 0, 2), BlockType::Container).unwrap();
        world.set_block_at(Point3::new(2, 3, 2), BlockType::Stone).unwrap();

        assert_eq!(world.top_solid_y(2, 2), Some(3));
        assert_eq!(world.surface_height(2, 2), Some(4));
        assert_eq!(world.surface_height(-1, 2), None);
    }

    #[test]
    fn chunk_blocks_yields_local_positions_of_solid_voxels() {
        let mut world = small_world();
        world.set_block_at(Point3::new(4, 4, 4), BlockType::Nest).unwrap();
        world.set_block_at(Point3::new(7, 5, 4), BlockType::Acid).unwrap();
        world.set_block_at(Point3::new(0, 0, 0), BlockType::Stone).unwrap();

        let blocks: Vec<_> = world.chunk_blocks(Point3::new(1, 1, 1)).collect();

        assert_eq!(
            blocks,
            vec![
                (Point3::new(0, 0, 0), BlockType::Nest),
                (Point3::new(3, 1, 0), BlockType::Acid),
            ]
        );
    }

    #[test]
    fn bytes_follow_storage_order() {
        let mut world = small_world();
        world.set_block_at(Point3::new(1, 0, 0), BlockType::Grass).unwrap();
        world.set_block_at(Point3::new(0, 0, 1), BlockType::Mulch).unwrap();

        let bytes = world.as_bytes();
        assert_eq!(bytes.len(), 8 * 8 * 8);
        assert_eq!(bytes[1], BlockType::Grass as u8);
        assert_eq!(bytes[8], BlockType::Mulch as u8);
        assert_eq!(world.count_blocks(BlockType::Grass), 1);
    }
}
