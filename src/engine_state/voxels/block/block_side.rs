//! # Block Side Module
//!
//! This module defines the six faces of a voxel block, their outward directions, and the
//! fixed index offsets that step from a block to its neighbour inside a chunk array.

use cgmath::Vector3;
use num_derive::FromPrimitive;

use crate::engine_state::voxels::chunk::{CHUNK_LAYER_STRIDE, CHUNK_ROW_STRIDE};

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value which is what the mesher writes into
/// `BlockFaceInstance::face` and what the chunk shader switches on.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// The front face (facing negative Z)
    FRONT = 0,

    /// The back face (facing positive Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
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

    /// Decodes a face byte written by the mesher.
    pub fn from_raw(value: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(value)
    }

    /// Unit vector pointing out of this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, -1),
            BlockSide::BACK => Vector3::new(0, 0, 1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Offset in a chunk's block array from a block to its neighbour across this face.
    ///
    /// `±1` for left/right, `±row stride` for front/back, `±layer stride` for top/bottom.
    /// The offset alone says nothing about whether the neighbour is in the same chunk.
    pub fn index_offset(self) -> isize {
        match self {
            BlockSide::FRONT => -(CHUNK_ROW_STRIDE as isize),
            BlockSide::BACK => CHUNK_ROW_STRIDE as isize,
            BlockSide::BOTTOM => -(CHUNK_LAYER_STRIDE as isize),
            BlockSide::TOP => CHUNK_LAYER_STRIDE as isize,
            BlockSide::LEFT => -1,
            BlockSide::RIGHT => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_bytes_decode_to_the_same_side() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_raw(side as u8), Some(side));
        }
        assert_eq!(BlockSide::from_raw(6), None);
    }

    #[test]
    fn test_top_offset_is_one_layer() {
        assert_eq!(BlockSide::TOP.index_offset(), CHUNK_LAYER_STRIDE as isize);
        assert_eq!(BlockSide::FRONT.normal(), Vector3::new(0, 0, -1));
    }
}
