//! # Terrain Generation
//!
//! Layered Perlin noise turning a `(seed, chunk position)` pair into block types.
//!
//! ## Layers
//!
//! For each column `(X, Z)` in world space:
//! 1. **Temperature** picks the surface material: ground when warm, snow when cold.
//! 2. **Height** places the surface. Columns just on the warm side of the biome edge are
//!    flattened into a low river band.
//! 3. Blocks above `height·23` are air, the next `height·3` blocks are the surface material,
//!    and everything below is stone.
//! 4. Stone is salted with iron ore from a second 3-D field and carved by a third.
//! 5. The bottom layer is always stone.
//!
//! Every sample is a pure function of the seed and world coordinates, so regenerating an
//! evicted slot reproduces identical terrain.

use noise::{NoiseFn, Perlin};

use super::{Chunk, ChunkPosition, CHUNK_SX, CHUNK_SY, CHUNK_SZ};
use crate::engine_state::voxels::block::{block_type::BlockType, Block};

/// Base frequency applied on top of every layer's own scale factor.
pub const NOISE_FREQUENCY: f64 = 0.01;

const TEMPERATURE_SCALE: f64 = 0.7;
const HEIGHT_SCALE: f64 = 6.0;
const ORE_SCALE: f64 = 30.0;
const CAVE_SCALE: f64 = 5.0;

/// Temperature above which the surface is ground rather than snow.
pub const BIOME_EDGE: f64 = 0.5;
/// Width of the warm-side band flattened into a river.
pub const RIVER_WIDTH: f64 = 0.06;
const RIVER_HEIGHT_FACTOR: f64 = 0.15;
const RIVER_HEIGHT_BASE: f64 = 0.2;

/// Height multiplier for the top of the terrain.
pub const SURFACE_LEVEL: f64 = 23.0;
/// Height multiplier for the top of the stone layer.
pub const STONE_LEVEL: f64 = 20.0;

const ORE_THRESHOLD: f64 = 0.7;
const CAVE_BAND: (f64, f64) = (0.5, 0.56);

const ORE_SEED_SHIFT: u32 = 1;
const CAVE_SEED_SHIFT: u32 = 2;

/// Per-column surface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainColumn {
    /// Surface material of this column.
    pub ground: BlockType,
    /// Normalised height in `[0, 1]`.
    pub height: f64,
}

/// The noise fields for one world seed. Cheap to share between worker threads.
pub struct TerrainGenerator {
    seed: u32,
    surface: Perlin,
    ore: Perlin,
    caves: Perlin,
}

/// Remaps Perlin output from `[-1, 1]` to `[0, 1]`.
fn normalized(sample: f64) -> f64 {
    ((sample + 1.0) / 2.0).clamp(0.0, 1.0)
}

impl TerrainGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            surface: Perlin::new(seed),
            ore: Perlin::new(seed.wrapping_add(ORE_SEED_SHIFT)),
            caves: Perlin::new(seed.wrapping_add(CAVE_SEED_SHIFT)),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Biome and height for the world column at `(world_x, world_z)`.
    pub fn column(&self, world_x: i32, world_z: i32) -> TerrainColumn {
        let x = world_x as f64 * NOISE_FREQUENCY;
        let z = world_z as f64 * NOISE_FREQUENCY;

        let temperature = normalized(
            self.surface
                .get([x * TEMPERATURE_SCALE, z * TEMPERATURE_SCALE]),
        );
        let ground = if temperature > BIOME_EDGE {
            BlockType::GROUND
        } else {
            BlockType::SNOW
        };

        let mut height = normalized(self.surface.get([x * HEIGHT_SCALE, z * HEIGHT_SCALE]));
        if temperature > BIOME_EDGE && temperature - RIVER_WIDTH <= BIOME_EDGE {
            height = height * RIVER_HEIGHT_FACTOR + RIVER_HEIGHT_BASE;
        }

        TerrainColumn { ground, height }
    }

    /// Block type at height `y` of a column.
    pub fn block_at(&self, column: TerrainColumn, world_x: i32, y: usize, world_z: i32) -> BlockType {
        if y == 0 {
            return BlockType::STONE;
        }

        let level = y as f64;
        if level > column.height * SURFACE_LEVEL {
            return BlockType::AIR;
        }
        if level > column.height * STONE_LEVEL {
            return column.ground;
        }

        let point = [
            world_x as f64 * NOISE_FREQUENCY,
            level * NOISE_FREQUENCY,
            world_z as f64 * NOISE_FREQUENCY,
        ];

        let cave = normalized(self.caves.get(point.map(|v| v * CAVE_SCALE)));
        if cave > CAVE_BAND.0 && cave < CAVE_BAND.1 {
            return BlockType::AIR;
        }

        let ore = normalized(self.ore.get(point.map(|v| v * ORE_SCALE)));
        if ore > ORE_THRESHOLD {
            BlockType::IRON_ORE
        } else {
            BlockType::STONE
        }
    }

    /// Writes the full volume of the chunk at `position` into `blocks`.
    ///
    /// # Arguments
    /// * `position` - Chunk grid position being generated
    /// * `blocks` - Destination array of length `CHUNK_VOLUME`
    pub fn fill(&self, position: ChunkPosition, blocks: &mut [Block]) {
        for z in 0..CHUNK_SZ {
            for x in 0..CHUNK_SX {
                let world_x = position.x + x as i32;
                let world_z = position.z + z as i32;
                let column = self.column(world_x, world_z);
                for y in 0..CHUNK_SY {
                    blocks[Chunk::index(x, y, z)] =
                        Block::new(self.block_at(column, world_x, y, world_z));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_VOLUME;

    fn generate(seed: u32, position: ChunkPosition) -> Vec<Block> {
        let mut blocks = vec![Block::default(); CHUNK_VOLUME];
        TerrainGenerator::new(seed).fill(position, &mut blocks);
        blocks
    }

    #[test]
    fn test_generation_is_deterministic() {
        let position = ChunkPosition::new(-32, 48);
        assert_eq!(generate(7, position), generate(7, position));
    }

    #[test]
    fn test_bottom_layer_is_bedrock() {
        let blocks = generate(3, ChunkPosition::new(160, -64));
        for z in 0..CHUNK_SZ {
            for x in 0..CHUNK_SX {
                assert_eq!(blocks[Chunk::index(x, 0, z)].block_type, BlockType::STONE);
            }
        }
    }

    #[test]
    fn test_nothing_above_surface_level() {
        let blocks = generate(0, ChunkPosition::new(0, 0));
        for y in (SURFACE_LEVEL as usize + 1)..CHUNK_SY {
            for z in 0..CHUNK_SZ {
                for x in 0..CHUNK_SX {
                    assert!(blocks[Chunk::index(x, y, z)].is_air());
                }
            }
        }
    }

    #[test]
    fn test_surface_layer_uses_column_ground() {
        let generator = TerrainGenerator::new(11);
        let column = generator.column(5, 9);
        let top_of_ground = (column.height * SURFACE_LEVEL).floor() as usize;
        if top_of_ground as f64 > column.height * STONE_LEVEL && top_of_ground > 0 {
            assert_eq!(generator.block_at(column, 5, top_of_ground, 9), column.ground);
        }
        assert_eq!(generator.block_at(column, 5, top_of_ground + 1, 9), BlockType::AIR);
    }

    #[test]
    fn test_river_band_flattens_height() {
        let generator = TerrainGenerator::new(0);
        for world_x in (-2000..2000).step_by(7) {
            let column = generator.column(world_x, world_x / 3);
            if column.ground == BlockType::GROUND {
                // River columns never rise above 0.15 + 0.2.
                let temperature = normalized(generator.surface.get([
                    world_x as f64 * NOISE_FREQUENCY * TEMPERATURE_SCALE,
                    (world_x / 3) as f64 * NOISE_FREQUENCY * TEMPERATURE_SCALE,
                ]));
                if temperature - RIVER_WIDTH <= BIOME_EDGE {
                    assert!(column.height <= RIVER_HEIGHT_FACTOR + RIVER_HEIGHT_BASE + 1e-9);
                }
            }
        }
    }
}
