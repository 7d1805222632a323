//! # Block Module
//!
//! Block type definitions, block face directions and the per-block value stored in a
//! chunk's dense block array.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// Atlas tile holding the sun sprite.
pub const SUN_TEXTURE_INDEX: u16 = 2;
/// Atlas tile holding the moon sprite.
pub const MOON_TEXTURE_INDEX: u16 = 3;

/// Maps each block type to its atlas tile for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array is indexed by `BlockSide` as a `usize`:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u16; 6]; 5] = [
    [0, 0, 0, 0, 0, 0], // AIR (never meshed)
    [0, 0, 0, 0, 0, 0], // GROUND
    [4, 4, 4, 4, 4, 4], // SNOW
    [1, 1, 1, 1, 1, 1], // STONE
    [5, 5, 5, 5, 5, 5], // IRON_ORE
];

/// A single voxel.
///
/// Blocks have no identity of their own; a block is whatever sits at a given index of its
/// chunk's block array. Editing a block overwrites `block_type` in place.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Block {
    pub block_type: BlockType,
    /// Flat shading factor in `[0, 1]`, present only when occlusion shading is enabled.
    pub brightness: Option<f32>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new(BlockType::AIR)
    }
}

impl Block {
    /// Creates a new unshaded block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type,
            brightness: None,
        }
    }

    pub fn is_air(&self) -> bool {
        self.block_type == BlockType::AIR
    }

    /// Gets the atlas tile for one face of this block.
    pub fn texture_index(&self, side: BlockSide) -> u16 {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self.block_type as usize][side as usize]
    }
}
