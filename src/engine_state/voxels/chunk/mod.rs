//! # Chunk Module
//!
//! This module provides the `Chunk` struct: one fixed-size column of `CHUNK_SX × CHUNK_SY ×
//! CHUNK_SZ` blocks, together with the face mesh built from it.
//!
//! ## Storage
//!
//! Blocks live in a dense row-major array. The index of the block at local `(x, y, z)` is
//! `x + z·CHUNK_ROW_STRIDE + y·CHUNK_LAYER_STRIDE`, so stepping ±1 moves along x, ±row stride
//! along z and ±layer stride along y. The array and the mesh buffer are allocated once when
//! the slot is created and are overwritten, never reallocated, when the slot is reassigned.
//!
//! ## Generation
//!
//! `Chunk::generate` is only ever called while the caller holds the slot's write lock, and
//! `generated` is cleared first and set last, so no reader can observe a half-written chunk.

use std::collections::TryReserveError;

use super::block::{block_side::BlockSide, Block};
use crate::engine_state::rendering::meshing::{self, ChunkMesh};

pub mod lighting;
pub mod terrain;

use terrain::TerrainGenerator;

/// Width of a chunk along x.
pub const CHUNK_SX: usize = 16;
/// Height of a chunk along y.
pub const CHUNK_SY: usize = 32;
/// Depth of a chunk along z.
pub const CHUNK_SZ: usize = 16;
/// Index distance between neighbouring blocks along z.
pub const CHUNK_ROW_STRIDE: usize = CHUNK_SX;
/// Index distance between neighbouring blocks along y.
pub const CHUNK_LAYER_STRIDE: usize = CHUNK_SX * CHUNK_SZ;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_LAYER_STRIDE * CHUNK_SY;

// Packed face positions are u16.
const _: () = assert!(CHUNK_VOLUME <= u16::MAX as usize + 1);

/// World-space position of a chunk's minimum corner on the xz grid.
///
/// Both components are always multiples of the chunk dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkPosition {
    pub x: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk grid position whose footprint contains the world point `(x, z)`.
    pub fn containing(x: f32, z: f32) -> Self {
        Self {
            x: (x / CHUNK_SX as f32).floor() as i32 * CHUNK_SX as i32,
            z: (z / CHUNK_SZ as f32).floor() as i32 * CHUNK_SZ as i32,
        }
    }

    /// The position `dx`, `dz` whole chunks away from this one.
    pub fn offset_by_chunks(&self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx * CHUNK_SX as i32,
            z: self.z + dz * CHUNK_SZ as i32,
        }
    }

    /// Whether the footprint `[x, x+SX) × [z, z+SZ)` contains the world point.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.x as f32
            && x < (self.x + CHUNK_SX as i32) as f32
            && z >= self.z as f32
            && z < (self.z + CHUNK_SZ as i32) as f32
    }

    /// Chebyshev-style streaming test: inside unless either axis is more than `radius`
    /// chunks away from `center`.
    pub fn is_within_radius(&self, center: ChunkPosition, radius: u32) -> bool {
        let reach_x = radius as i32 * CHUNK_SX as i32;
        let reach_z = radius as i32 * CHUNK_SZ as i32;
        (self.x - center.x).abs() <= reach_x && (self.z - center.z).abs() <= reach_z
    }
}

/// One slot's worth of voxel data.
pub struct Chunk {
    /// Position of the terrain currently stored in `blocks`.
    pub position: ChunkPosition,
    /// Dense block array of length `CHUNK_VOLUME`.
    pub blocks: Vec<Block>,
    /// Face instances built from `blocks`.
    pub mesh: ChunkMesh,
    /// True once `blocks` holds a complete generation for `position`.
    pub generated: bool,
}

impl Chunk {
    /// Allocates an empty (all air, not generated) chunk with full-capacity buffers.
    ///
    /// # Returns
    /// An error if the block array or the mesh buffer cannot be reserved
    pub fn try_new() -> Result<Self, TryReserveError> {
        let mut blocks = Vec::new();
        blocks.try_reserve_exact(CHUNK_VOLUME)?;
        blocks.resize(CHUNK_VOLUME, Block::default());

        Ok(Self {
            position: ChunkPosition::default(),
            blocks,
            mesh: ChunkMesh::try_new()?,
            generated: false,
        })
    }

    /// Flattens local coordinates to an array index. Coordinates must be in range.
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        x + z * CHUNK_ROW_STRIDE + y * CHUNK_LAYER_STRIDE
    }

    /// Expands an array index back to local `(x, y, z)`.
    pub fn coordinates(index: usize) -> (usize, usize, usize) {
        let x = index % CHUNK_SX;
        let z = (index / CHUNK_ROW_STRIDE) % CHUNK_SZ;
        let y = index / CHUNK_LAYER_STRIDE;
        (x, y, z)
    }

    /// Bounds-checked version of `index` for signed local coordinates.
    pub fn local_index(x: i32, y: i32, z: i32) -> Option<usize> {
        let in_range = (0..CHUNK_SX as i32).contains(&x)
            && (0..CHUNK_SY as i32).contains(&y)
            && (0..CHUNK_SZ as i32).contains(&z);
        in_range.then(|| Self::index(x as usize, y as usize, z as usize))
    }

    /// Index of the neighbour across `side`, or `None` if that neighbour lies outside this
    /// chunk. A bare `index + side.index_offset()` would silently wrap into the next row or
    /// layer at the chunk edges.
    pub fn neighbor_index(index: usize, side: BlockSide) -> Option<usize> {
        let (x, y, z) = Self::coordinates(index);
        let normal = side.normal();
        Self::local_index(x as i32 + normal.x, y as i32 + normal.y, z as i32 + normal.z)
    }

    /// Regenerates every block for the terrain at `position`. The mesh is left stale; callers
    /// follow up with `remesh`.
    ///
    /// # Arguments
    /// * `terrain` - Noise fields for the world seed
    /// * `position` - Chunk grid position to generate
    /// * `occlusion_shading` - Whether to compute per-block brightness
    pub fn generate(
        &mut self,
        terrain: &TerrainGenerator,
        position: ChunkPosition,
        occlusion_shading: bool,
    ) {
        self.generated = false;
        self.position = position;
        terrain.fill(position, &mut self.blocks);
        lighting::update_brightness(&mut self.blocks, occlusion_shading);
        self.generated = true;
    }

    /// Rebuilds the whole face list from the current block array.
    pub fn remesh(&mut self) {
        meshing::mesh_chunk(&self.blocks, &mut self.mesh);
    }

    /// Number of non-air blocks.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_air()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_layout_is_x_then_z_then_y() {
        assert_eq!(Chunk::index(1, 0, 0), 1);
        assert_eq!(Chunk::index(0, 0, 1), CHUNK_ROW_STRIDE);
        assert_eq!(Chunk::index(0, 1, 0), CHUNK_LAYER_STRIDE);
        assert_eq!(Chunk::coordinates(Chunk::index(3, 7, 11)), (3, 7, 11));
    }

    #[test]
    fn test_neighbor_index_stops_at_edges() {
        let corner = Chunk::index(CHUNK_SX - 1, 0, 0);
        assert_eq!(Chunk::neighbor_index(corner, BlockSide::RIGHT), None);
        assert_eq!(Chunk::neighbor_index(corner, BlockSide::BOTTOM), None);
        assert_eq!(Chunk::neighbor_index(corner, BlockSide::FRONT), None);
        assert_eq!(
            Chunk::neighbor_index(corner, BlockSide::TOP),
            Some(corner + CHUNK_LAYER_STRIDE)
        );
        assert_eq!(Chunk::neighbor_index(corner, BlockSide::LEFT), Some(corner - 1));
    }

    #[test]
    fn test_chunk_position_grid_and_containment() {
        assert_eq!(ChunkPosition::containing(-0.5, 17.0), ChunkPosition::new(-16, 16));
        let position = ChunkPosition::new(16, -16);
        assert!(position.contains(16.0, -16.0));
        assert!(position.contains(31.9, -0.1));
        assert!(!position.contains(32.0, -8.0));
        assert!(!position.contains(20.0, 0.0));
    }

    #[test]
    fn test_streaming_radius_is_chebyshev() {
        let center = ChunkPosition::new(0, 0);
        assert!(center.offset_by_chunks(2, -2).is_within_radius(center, 2));
        assert!(!center.offset_by_chunks(3, 0).is_within_radius(center, 2));
        assert!(!center.offset_by_chunks(0, -3).is_within_radius(center, 2));
    }

    #[test]
    fn test_new_chunk_is_empty_and_not_generated() {
        let chunk = Chunk::try_new().unwrap();
        assert_eq!(chunk.blocks.len(), CHUNK_VOLUME);
        assert!(!chunk.generated);
        assert_eq!(chunk.solid_count(), 0);
        assert_eq!(chunk.mesh.face_count, 0);
    }
}
