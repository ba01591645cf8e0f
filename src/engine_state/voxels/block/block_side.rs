//! # Block Side Module
//!
//! This module defines the six faces of a voxel block. A face doubles as the
//! direction to the face-adjacent neighbor, which is how a mutation on a chunk
//! boundary finds the neighboring chunks whose surface it may change.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing negative X)
    FRONT = 0,

    /// The back face (facing positive X)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative Z)
    LEFT = 4,

    /// The right face (facing positive Z)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The unit offset from a block (or chunk) to its neighbor across this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(-1, 0, 0),
            BlockSide::BACK => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(0, 0, -1),
            BlockSide::RIGHT => Vector3::new(0, 0, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normals_cancel_out_pairwise() {
        let sum = BlockSide::all()
            .iter()
            .fold(Vector3::new(0, 0, 0), |acc, side| acc + side.normal());
        assert_eq!(sum, Vector3::new(0, 0, 0));
    }
}
