//! # Chunk Module
//!
//! Chunks partition the world grid into cubes of `chunk_diameter` voxels. In the
//! colony world a chunk carries no simulation data at all: the blocks live in the
//! world's dense grid, and a chunk only remembers whether its visible surface may
//! have changed since a renderer last looked at it.
//!
//! ## Storage
//!
//! The redraw flags of every chunk are packed in a single bit vector, one bit per
//! chunk, in row-major order (x, then z, then y), matching the block grid.
//!
//! ## Neighbor marking
//!
//! A block on the face of a chunk is also part of the surface the neighboring
//! chunk shows, so a mutation marks the owning chunk and its six face-adjacent
//! neighbors (those that exist).

use bitvec::prelude::BitVec;
use cgmath::{Point3, Vector3};

use super::block::block_side::BlockSide;

pub mod chunk_iteration;

/// A view of one chunk of the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,

    /// Whether a mutation may have changed the surface of this chunk since the
    /// flag was last cleared.
    pub needs_redraw: bool,
}

/// Redraw flags for every chunk of a world.
pub struct ChunkGrid {
    /// Number of chunks along each axis.
    dimensions: Vector3<usize>,

    /// One bit per chunk; set while the chunk needs to be redrawn.
    dirty: BitVec,
}

impl ChunkGrid {
    /// Creates a grid of `dimensions` chunks with every chunk flagged for redraw,
    /// since nothing has been drawn yet.
    pub fn new(dimensions: Vector3<usize>) -> Self {
        let count = dimensions.x * dimensions.y * dimensions.z;
        let mut dirty = BitVec::with_capacity(count);
        dirty.resize(count, true);
        ChunkGrid { dimensions, dirty }
    }

    /// Number of chunks along each axis.
    pub fn dimensions(&self) -> Vector3<usize> {
        self.dimensions
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

    fn position(&self, index: usize) -> Point3<i32> {
        let x = index % self.dimensions.x;
        let z = (index / self.dimensions.x) % self.dimensions.z;
        let y = index / (self.dimensions.x * self.dimensions.z);
        Point3::new(x as i32, y as i32, z as i32)
    }

    /// Flags the chunk at `position` and its face-adjacent neighbors.
    ///
    /// Positions outside the grid are skipped.
    pub fn mark_with_neighbors(&mut self, position: Point3<i32>) {
        self.mark(position);
        for side in BlockSide::all() {
            self.mark(position + side.normal());
        }
    }

    /// Flags a single chunk. Returns `false` if the position is outside the grid.
    pub fn mark(&mut self, position: Point3<i32>) -> bool {
        match self.index(position) {
            Some(index) => {
                self.dirty.set(index, true);
                true
            }
            None => false,
        }
    }

    /// Flags every chunk.
    pub fn mark_all(&mut self) {
        self.dirty.fill(true);
    }

    /// Whether the chunk at `position` needs to be redrawn.
    ///
    /// Positions outside the grid never do.
    pub fn is_dirty(&self, position: Point3<i32>) -> bool {
        self.index(position)
            .map(|index| self.dirty[index])
            .unwrap_or(false)
    }

    /// Clears the flag of one chunk after a renderer consumed it.
    pub fn clear(&mut self, position: Point3<i32>) {
        if let Some(index) = self.index(position) {
            self.dirty.set(index, false);
        }
    }

    /// Positions of all flagged chunks, in storage order.
    pub fn dirty_positions(&self) -> Vec<Point3<i32>> {
        self.dirty
            .iter_ones()
            .map(|index| self.position(index))
            .collect()
    }

    /// Returns the positions of all flagged chunks and clears their flags.
    pub fn take_dirty(&mut self) -> Vec<Point3<i32>> {
        let positions = self.dirty_positions();
        self.dirty.fill(false);
        positions
    }

    /// Every chunk of the grid with its current flag.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.dirty.len()).map(move |index| Chunk {
            position: self.position(index),
            needs_redraw: self.dirty[index],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_grid(x: usize, y: usize, z: usize) -> ChunkGrid {
        let mut grid = ChunkGrid::new(Vector3::new(x, y, z));
        grid.take_dirty();
        grid
    }

    #[test]
    fn new_grid_is_fully_dirty() {
        let grid = ChunkGrid::new(Vector3::new(2, 1, 3));
        assert_eq!(grid.dirty_positions().len(), 6);
    }

    #[test]
    fn interior_mark_touches_seven_chunks() {
        let mut grid = clean_grid(3, 3, 3);
        grid.mark_with_neighbors(Point3::new(1, 1, 1));

        let dirty = grid.dirty_positions();
        assert_eq!(dirty.len(), 7);
        assert!(grid.is_dirty(Point3::new(1, 1, 1)));
        assert!(grid.is_dirty(Point3::new(1, 2, 1)));
        assert!(grid.is_dirty(Point3::new(1, 1, 0)));
        assert!(!grid.is_dirty(Point3::new(0, 0, 0)));
    }

    #[test]
    fn corner_mark_skips_missing_neighbors() {
        let mut grid = clean_grid(3, 3, 3);
        grid.mark_with_neighbors(Point3::new(0, 0, 0));
        assert_eq!(grid.dirty_positions().len(), 4);
    }

    #[test]
    fn positions_round_trip_through_storage_order() {
        let grid = ChunkGrid::new(Vector3::new(2, 3, 4));
        for chunk in grid.chunks() {
            let index = grid.index(chunk.position).unwrap();
            assert_eq!(grid.position(index), chunk.position);
        }
    }

    #[test]
    fn clear_only_affects_one_chunk() {
        let mut grid = ChunkGrid::new(Vector3::new(2, 1, 1));
        grid.clear(Point3::new(0, 0, 0));
        assert!(!grid.is_dirty(Point3::new(0, 0, 0)));
        assert!(grid.is_dirty(Point3::new(1, 0, 0)));
    }
}
