//! # Block Type Module
//!
//! This module defines the different materials a block can be made of.

use num_derive::FromPrimitive;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are stable and index `BLOCK_TYPE_TO_TEXTURE_INDICES`.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Never meshed, never hit by rays.
    AIR = 0,

    /// Surface material of warm biomes.
    GROUND = 1,

    /// Surface material of cold biomes.
    SNOW = 2,

    /// Everything below the surface layer, and the bedrock row.
    STONE = 3,

    /// Ore pockets scattered through stone.
    IRON_ORE = 4,
}

impl BlockType {
    /// Converts a raw discriminant back to a `BlockType`.
    ///
    /// # Returns
    /// `None` if `value` does not name a block type
    pub fn from_raw(value: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(value)
    }

    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip_and_unknown_value() {
        assert_eq!(BlockType::from_raw(4), Some(BlockType::IRON_ORE));
        assert_eq!(BlockType::from_raw(9), None);
        assert!(!BlockType::AIR.is_solid());
        assert!(BlockType::SNOW.is_solid());
    }
}
