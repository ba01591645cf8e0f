//! # Block Type Module
//!
//! This module defines the different types of blocks in the colony world.
//! It provides functionality for block type identification and conversion from
//! the compact storage representation.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are the values stored in the grid, so the order of the
/// variants is part of the storage format. The `FromPrimitive` derive allows
/// conversion back from those integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Agents occupy air voxels and stand on anything else.
    Air = 0,

    /// Bedrock of every column. Used by the queen to climb.
    Stone = 1,

    /// The layer above the stone.
    Grass = 2,

    /// Edible top layer. Digging it restores health.
    Mulch = 3,

    /// Hazard filling the air pockets near the surface; standing on it doubles
    /// the damage taken each turn.
    Acid = 4,

    /// The indestructible shell of the world and its spherical obstacles.
    Container = 5,

    /// Produced by the queen every `nest_interval` turns.
    Nest = 6,
}

impl BlockType {
    /// Every block type, in storage order.
    pub const ALL: [BlockType; 7] = [
        BlockType::Air,
        BlockType::Stone,
        BlockType::Grass,
        BlockType::Mulch,
        BlockType::Acid,
        BlockType::Container,
        BlockType::Nest,
    ];

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// Values that do not name a block type decode as `Air`; the grid only ever
    /// stores values produced by `BlockType as BlockTypeSize`.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::Air)
    }

    /// Whether an agent can stand on top of this block.
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }

    /// Whether digging may remove this block.
    pub fn is_diggable(self) -> bool {
        self != BlockType::Container
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_values_decode_to_the_same_type() {
        for block_type in BlockType::ALL {
            assert_eq!(
                BlockType::get_block_type_from_int(block_type as BlockTypeSize),
                block_type
            );
        }
    }

    #[test]
    fn unknown_values_decode_as_air() {
        assert_eq!(BlockType::get_block_type_from_int(200), BlockType::Air);
    }

    #[test]
    fn only_container_resists_digging() {
        let diggable: Vec<_> = BlockType::ALL
            .into_iter()
            .filter(|block_type| !block_type.is_diggable())
            .collect();
        assert_eq!(diggable, vec![BlockType::Container]);
    }
}
