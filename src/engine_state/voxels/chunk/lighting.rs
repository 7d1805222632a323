//! Flat per-block occlusion shading.
//!
//! Each solid block is darkened by a fixed step for every solid neighbour inside its own
//! chunk. Neighbours across a chunk edge are not consulted.

use super::Chunk;
use crate::engine_state::voxels::block::{block_side::BlockSide, Block};

/// Brightness lost per solid neighbour.
pub const OCCLUSION_STEP: f32 = 0.3 / 6.0;

/// Recomputes `brightness` for every block, or clears it when shading is disabled.
pub fn update_brightness(blocks: &mut [Block], enabled: bool) {
    if !enabled {
        blocks.iter_mut().for_each(|block| block.brightness = None);
        return;
    }

    for index in 0..blocks.len() {
        if blocks[index].is_air() {
            blocks[index].brightness = None;
            continue;
        }

        let solid_neighbors = BlockSide::all()
            .into_iter()
            .filter_map(|side| Chunk::neighbor_index(index, side))
            .filter(|&neighbor| !blocks[neighbor].is_air())
            .count();

        blocks[index].brightness = Some(1.0 - solid_neighbors as f32 * OCCLUSION_STEP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{CHUNK_VOLUME},
    };

    #[test]
    fn test_buried_block_is_darkest() {
        let mut blocks = vec![Block::new(BlockType::STONE); CHUNK_VOLUME];
        update_brightness(&mut blocks, true);
        let inner = Chunk::index(4, 4, 4);
        assert_eq!(blocks[inner].brightness, Some(1.0 - 6.0 * OCCLUSION_STEP));
        let corner = Chunk::index(0, 0, 0);
        assert_eq!(blocks[corner].brightness, Some(1.0 - 3.0 * OCCLUSION_STEP));
    }

    #[test]
    fn test_disabled_shading_clears_brightness() {
        let mut blocks = vec![Block::new(BlockType::STONE); CHUNK_VOLUME];
        update_brightness(&mut blocks, true);
        update_brightness(&mut blocks, false);
        assert!(blocks.iter().all(|block| block.brightness.is_none()));
    }
}
