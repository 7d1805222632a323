//! Face meshing for chunks.
//!
//! Turns a chunk's dense block array into one instance per visible block face. A face is
//! visible when the neighbour across it is air or lies outside the chunk; faces between
//! two solid blocks are never emitted. Every instance is drawn as the same unit quad, placed
//! and oriented in the vertex shader from the packed position and face byte.
//!
//! # Performance Considerations
//! - The instance buffer is sized for the worst case (`CHUNK_VOLUME × 6`) when the chunk slot
//!   is created and is overwritten in place on every remesh
//! - A remesh always rebuilds the whole chunk, including after a single-block edit

use std::collections::TryReserveError;

mod face_instance;

pub use face_instance::{BlockFaceInstance, UNSHADED};

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, Block},
    chunk::{Chunk, CHUNK_VOLUME},
};

/// Upper bound on faces in one chunk.
pub const MAX_FACES_PER_CHUNK: usize = CHUNK_VOLUME * 6;

/// The face list of one chunk.
pub struct ChunkMesh {
    /// Fixed-capacity buffer; only the first `face_count` entries are meaningful.
    pub faces: Vec<BlockFaceInstance>,
    /// Number of faces written by the last remesh.
    pub face_count: usize,
}

impl ChunkMesh {
    /// Allocates a mesh with room for `MAX_FACES_PER_CHUNK` faces.
    pub fn try_new() -> Result<Self, TryReserveError> {
        let mut faces = Vec::new();
        faces.try_reserve_exact(MAX_FACES_PER_CHUNK)?;
        faces.resize(MAX_FACES_PER_CHUNK, BlockFaceInstance::default());
        Ok(Self {
            faces,
            face_count: 0,
        })
    }

    /// The faces written by the last remesh.
    pub fn visible_faces(&self) -> &[BlockFaceInstance] {
        &self.faces[..self.face_count]
    }
}

/// Rebuilds `mesh` from `blocks`.
///
/// # Arguments
/// * `blocks` - Dense block array of length `CHUNK_VOLUME`
/// * `mesh` - Destination mesh; its previous contents are overwritten
pub fn mesh_chunk(blocks: &[Block], mesh: &mut ChunkMesh) {
    let mut face_count = 0;

    for (index, block) in blocks.iter().enumerate() {
        if block.is_air() {
            continue;
        }

        for side in BlockSide::all() {
            let neighbor_is_solid = Chunk::neighbor_index(index, side)
                .map(|neighbor| !blocks[neighbor].is_air())
                .unwrap_or(false);
            if neighbor_is_solid {
                continue;
            }

            mesh.faces[face_count] =
                BlockFaceInstance::new(index, side, block.texture_index(side), block.brightness);
            face_count += 1;
        }
    }

    mesh.face_count = face_count;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn empty_blocks() -> Vec<Block> {
        vec![Block::default(); CHUNK_VOLUME]
    }

    #[test]
    fn test_single_block_emits_six_faces() {
        let mut blocks = empty_blocks();
        let index = Chunk::index(4, 4, 4);
        blocks[index] = Block::new(BlockType::STONE);
        let mut mesh = ChunkMesh::try_new().unwrap();

        mesh_chunk(&blocks, &mut mesh);

        assert_eq!(mesh.face_count, 6);
        assert!(mesh
            .visible_faces()
            .iter()
            .all(|face| face.position as usize == index && face.texture_id == 1));
    }

    #[test]
    fn test_shared_face_is_culled() {
        let mut blocks = empty_blocks();
        blocks[Chunk::index(4, 4, 4)] = Block::new(BlockType::STONE);
        blocks[Chunk::index(5, 4, 4)] = Block::new(BlockType::GROUND);
        let mut mesh = ChunkMesh::try_new().unwrap();

        mesh_chunk(&blocks, &mut mesh);

        assert_eq!(mesh.face_count, 10);
        let left_block_right_faces = mesh
            .visible_faces()
            .iter()
            .filter(|face| {
                face.position as usize == Chunk::index(4, 4, 4)
                    && face.side() == Some(BlockSide::RIGHT)
            })
            .count();
        assert_eq!(left_block_right_faces, 0);
    }

    #[test]
    fn test_faces_on_chunk_border_are_emitted() {
        let mut blocks = vec![Block::new(BlockType::STONE); CHUNK_VOLUME];
        let mut mesh = ChunkMesh::try_new().unwrap();

        mesh_chunk(&blocks, &mut mesh);

        use crate::engine_state::voxels::chunk::{CHUNK_SX, CHUNK_SY, CHUNK_SZ};
        let shell = 2 * (CHUNK_SX * CHUNK_SY + CHUNK_SY * CHUNK_SZ + CHUNK_SX * CHUNK_SZ);
        assert_eq!(mesh.face_count, shell);

        blocks.iter_mut().for_each(|block| *block = Block::default());
        mesh_chunk(&blocks, &mut mesh);
        assert_eq!(mesh.face_count, 0);
    }

    #[test]
    fn test_brightness_becomes_shade() {
        let mut blocks = empty_blocks();
        blocks[0] = Block {
            block_type: BlockType::SNOW,
            brightness: Some(0.5),
        };
        let mut mesh = ChunkMesh::try_new().unwrap();

        mesh_chunk(&blocks, &mut mesh);

        assert!(mesh.visible_faces().iter().all(|face| face.shade == 128));
        assert_eq!(mesh.visible_faces()[0].texture_id, 4);
    }
}
