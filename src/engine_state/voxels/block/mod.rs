//! # Block Module
//!
//! This module provides the core block-related functionality for the colony world.
//! It includes block type definitions, block face handling, and the compact
//! per-voxel storage cell.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Represents a single voxel block in the world.
///
/// This is a lightweight structure that stores only the block type. A voxel
/// carries no other state.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and the `Pod` derive let the whole grid be handed
/// to a renderer as a flat byte slice.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// The decoded type of this block.
    pub fn block_type(&self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::new(BlockType::Air)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_block_is_air() {
        let block: Block = bytemuck::Zeroable::zeroed();
        assert_eq!(block.block_type(), BlockType::Air);
        assert_eq!(block, Block::default());
    }
}
