//! # World Module
//!
//! This module provides `GameWorld`, the fixed-capacity store of chunk slots that makes up
//! the streaming window, and the position and ray queries over it.
//!
//! ## Architecture
//!
//! The world is an arena of `ChunkSlot`s allocated once at startup and never grown. When
//! the viewpoint moves, a slot is reassigned to a new chunk position and its content is
//! regenerated in place by a worker. Two views of a slot exist:
//!
//! - the **assignment**, owned by the main thread, says which position the slot is meant to
//!   hold. It changes the moment the scheduler evicts the slot
//! - the **content**, behind the slot's lock, is what a worker last generated. It catches up
//!   with the assignment once the worker's task runs
//!
//! Queries only answer from slots whose content matches their assignment, so a position is
//! never served from a chunk that is about to be overwritten.
//!
//! ## Locking
//!
//! Workers take a slot's write lock for the whole generate-and-mesh step. The main thread
//! only ever uses `try_get`/`try_get_mut` on slots, so it never stalls behind a worker; a
//! busy slot is reported as a miss and the caller retries next frame.
//!
//! ## Performance Considerations
//!
//! - Position lookup is a linear scan over at most `(2R+1)²` slots, which is cheap at the
//!   render distances the engine runs with
//! - Block and mesh buffers are reserved in `GameWorld::new` and reused for every chunk a
//!   slot ever holds

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, info};

use crate::{
    core::{EngineError, MtResource},
    engine_state::{
        rendering::InstanceUploader,
        task_management::TaskProcessor,
        voxels::{
            block::{block_type::BlockType, Block},
            chunk::{lighting, terrain::TerrainGenerator, Chunk, ChunkPosition},
            tasks::chunk_generation_task::{ChunkGenerationProcessor, ChunkGenerationTask},
        },
    },
};

/// Distance between consecutive ray samples.
pub const RAY_STEP: f32 = 1.0;

/// Lock-free bookkeeping shared between the main thread and the workers for one slot.
#[derive(Debug, Default)]
pub struct SlotStatus {
    latest_ticket: AtomicU64,
    fulfilled_ticket: AtomicU64,
    needs_upload: AtomicBool,
}

impl SlotStatus {
    /// Starts a new assignment and returns its ticket.
    pub fn issue_ticket(&self) -> u64 {
        self.latest_ticket.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn latest_ticket(&self) -> u64 {
        self.latest_ticket.load(Ordering::Acquire)
    }

    /// Whether `ticket` is still the newest assignment of the slot.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest_ticket() == ticket
    }

    pub fn mark_fulfilled(&self, ticket: u64) {
        self.fulfilled_ticket.fetch_max(ticket, Ordering::AcqRel);
    }

    /// Whether the latest assignment has not been generated yet.
    pub fn is_pending(&self) -> bool {
        self.fulfilled_ticket.load(Ordering::Acquire) < self.latest_ticket()
    }

    pub fn flag_for_upload(&self) {
        self.needs_upload.store(true, Ordering::Release);
    }

    pub fn needs_upload(&self) -> bool {
        self.needs_upload.load(Ordering::Acquire)
    }

    /// Clears the upload flag, returning whether it was set.
    pub fn take_upload_flag(&self) -> bool {
        self.needs_upload.swap(false, Ordering::AcqRel)
    }
}

/// One reusable entry of the world's slot array.
#[derive(Clone)]
pub struct ChunkSlot {
    pub chunk: MtResource<Chunk>,
    pub status: Arc<SlotStatus>,
}

impl ChunkSlot {
    fn try_new() -> Option<Self> {
        Some(Self {
            chunk: MtResource::new(Chunk::try_new().ok()?),
            status: Arc::new(SlotStatus::default()),
        })
    }
}

/// Names one block of one chunk.
///
/// A handle stays meaningful after the slot it points at is reassigned: every read or write
/// through it first checks that the slot still holds `chunk`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHandle {
    /// Slot that held the block when the handle was made
    pub slot: usize,
    /// Index into the chunk's block array
    pub index: usize,
    /// Position of the chunk the block belongs to
    pub chunk: ChunkPosition,
    /// Integer world position of the block
    pub voxel: Point3<i32>,
    /// The block as it was when the handle was made
    pub block: Block,
}

/// The voxel world: a fixed array of chunk slots plus the terrain generator that fills them.
///
/// # Examples
///
/// ```
/// use cubes_engine::engine_state::voxels::world::GameWorld;
/// use cgmath::Point3;
///
/// let mut world = GameWorld::new(1, 7, false).unwrap();
/// world.generate_chunk(0, 0, 0);
///
/// let handle = world.peek_block_from_pos(Point3::new(3.5, 0.5, 3.5)).unwrap();
/// assert!(!handle.block.is_air());
/// ```
pub struct GameWorld {
    slots: Vec<ChunkSlot>,
    assignments: Vec<Option<ChunkPosition>>,
    terrain: Arc<TerrainGenerator>,
    occlusion_shading: bool,
}

impl GameWorld {
    /// Allocates every slot up front.
    ///
    /// # Arguments
    /// * `slot_count` - The number of chunks kept live, usually `(2R+1)²`
    /// * `seed` - Terrain seed
    /// * `occlusion_shading` - Whether blocks get neighbour-count brightness
    ///
    /// # Returns
    /// `EngineError::WorldAllocation` if the block or mesh buffers cannot be reserved
    pub fn new(slot_count: usize, seed: u32, occlusion_shading: bool) -> Result<Self, EngineError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(slot_count)
            .map_err(|_| EngineError::WorldAllocation { slots: slot_count })?;
        for _ in 0..slot_count {
            slots.push(ChunkSlot::try_new().ok_or(EngineError::WorldAllocation { slots: slot_count })?);
        }

        info!("Allocated {} chunk slots (seed {})", slot_count, seed);

        Ok(Self {
            slots,
            assignments: vec![None; slot_count],
            terrain: Arc::new(TerrainGenerator::new(seed)),
            occlusion_shading,
        })
    }

    pub fn seed(&self) -> u32 {
        self.terrain.seed()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot: usize) -> &ChunkSlot {
        &self.slots[slot]
    }

    pub fn slots(&self) -> &[ChunkSlot] {
        &self.slots
    }

    /// The position a slot is assigned to, if any.
    pub fn assignment(&self, slot: usize) -> Option<ChunkPosition> {
        self.assignments.get(slot).copied().flatten()
    }

    /// The slot assigned to `position`, if any.
    pub fn slot_assigned_to(&self, position: ChunkPosition) -> Option<usize> {
        self.assignments
            .iter()
            .position(|assignment| *assignment == Some(position))
    }

    /// Reassigns a slot and returns the generation task that will fill it.
    ///
    /// Any task already issued for the slot becomes stale.
    pub fn assign_slot(&mut self, slot: usize, position: ChunkPosition) -> ChunkGenerationTask {
        self.assignments[slot] = Some(position);
        let ticket = self.slots[slot].status.issue_ticket();
        debug!("Assigned slot {} to {:?} (ticket {})", slot, position, ticket);

        ChunkGenerationTask {
            slot,
            world_x: position.x,
            world_z: position.z,
            ticket,
        }
    }

    /// A processor over this world's slots, for the worker pool.
    pub fn generation_processor(&self) -> ChunkGenerationProcessor {
        ChunkGenerationProcessor::new(
            self.slots.clone(),
            self.terrain.clone(),
            self.occlusion_shading,
        )
    }

    /// Assigns a slot and generates and meshes it on the calling thread.
    ///
    /// This blocks on the slot lock, so it is meant for startup and tests rather than the
    /// frame loop.
    ///
    /// # Arguments
    /// * `slot` - The slot to fill
    /// * `world_x` - World x of the chunk's minimum corner
    /// * `world_z` - World z of the chunk's minimum corner
    pub fn generate_chunk(&mut self, slot: usize, world_x: i32, world_z: i32) {
        let task = self.assign_slot(slot, ChunkPosition::new(world_x, world_z));
        self.generation_processor().process(task);
    }

    /// Finds the block containing a world position.
    ///
    /// # Returns
    /// `None` when no slot covers `(x, z)`, when `y` is outside the chunk height, or when the
    /// covering slot is being generated or has not caught up with its assignment yet
    pub fn peek_block_from_pos(&self, position: Point3<f32>) -> Option<BlockHandle> {
        let (slot, chunk_position) = self
            .assignments
            .iter()
            .enumerate()
            .find_map(|(slot, assignment)| {
                assignment
                    .filter(|chunk| chunk.contains(position.x, position.z))
                    .map(|chunk| (slot, chunk))
            })?;

        let voxel = Point3::new(
            position.x.floor() as i32,
            position.y.floor() as i32,
            position.z.floor() as i32,
        );
        let index = Chunk::local_index(
            voxel.x - chunk_position.x,
            voxel.y,
            voxel.z - chunk_position.z,
        )?;

        let chunk = self.slots[slot].chunk.try_get()?;
        if !chunk.generated || chunk.position != chunk_position {
            return None;
        }

        Some(BlockHandle {
            slot,
            index,
            chunk: chunk_position,
            voxel,
            block: chunk.blocks[index],
        })
    }

    /// Marches along a ray and returns the first non-air block.
    ///
    /// Samples are taken every `RAY_STEP` from the origin while the distance is below
    /// `max_distance`, so a ray can step over the corner of a block.
    ///
    /// # Arguments
    /// * `origin` - Start of the ray in world space
    /// * `direction` - Ray direction; need not be normalized
    /// * `max_distance` - Exclusive upper bound on the sample distance
    pub fn peek_block_from_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<BlockHandle> {
        if direction.magnitude2() == 0.0 {
            return None;
        }
        let direction = direction.normalize();

        let mut distance = 0.0;
        while distance < max_distance {
            let sample = origin + direction * distance;
            if let Some(handle) = self.peek_block_from_pos(sample) {
                if !handle.block.is_air() {
                    return Some(handle);
                }
            }
            distance += RAY_STEP;
        }

        None
    }

    /// Reads the current state of the block a handle names.
    pub fn block(&self, handle: &BlockHandle) -> Option<Block> {
        let chunk = self.slots.get(handle.slot)?.chunk.try_get()?;
        (chunk.generated && chunk.position == handle.chunk).then(|| chunk.blocks[handle.index])
    }

    /// Overwrites a block's type, refreshes brightness and rebuilds the chunk mesh.
    ///
    /// # Arguments
    /// * `slot` - The slot holding the chunk
    /// * `chunk_position` - The chunk the caller expects the slot to hold
    /// * `index` - Block index within the chunk
    /// * `block_type` - The new type
    ///
    /// # Returns
    /// `false` if the slot is busy, has been reassigned, or `index` is out of range
    pub fn edit_block(
        &self,
        slot: usize,
        chunk_position: ChunkPosition,
        index: usize,
        block_type: BlockType,
    ) -> bool {
        let Some(slot_ref) = self.slots.get(slot) else {
            return false;
        };
        let Some(mut chunk) = slot_ref.chunk.try_get_mut() else {
            debug!("Slot {} is busy, edit skipped", slot);
            return false;
        };
        if !chunk.generated || chunk.position != chunk_position || index >= chunk.blocks.len() {
            return false;
        }

        chunk.blocks[index].block_type = block_type;
        lighting::update_brightness(&mut chunk.blocks, self.occlusion_shading);
        chunk.remesh();
        slot_ref.status.flag_for_upload();
        true
    }

    /// Pushes a slot's current mesh to the uploader and clears its upload flag.
    ///
    /// # Returns
    /// `false` if the slot is locked by a worker; the flag is left set so the upload is
    /// retried later
    pub fn upload_slot(&self, slot: usize, uploader: &mut dyn InstanceUploader) -> bool {
        let slot_ref = &self.slots[slot];
        let Some(chunk) = slot_ref.chunk.try_get() else {
            return false;
        };

        slot_ref.status.take_upload_flag();
        if chunk.generated {
            uploader.upload_chunk(slot, chunk.position, chunk.mesh.visible_faces());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::{CHUNK_SX, CHUNK_SY, CHUNK_SZ};

    #[test]
    fn test_tickets_track_assignments() {
        let status = SlotStatus::default();
        assert!(!status.is_pending());

        let first = status.issue_ticket();
        let second = status.issue_ticket();
        assert!(!status.is_current(first));
        assert!(status.is_current(second));

        status.mark_fulfilled(second);
        status.mark_fulfilled(first);
        assert!(!status.is_pending());
    }

    #[test]
    fn test_upload_flag_is_taken_once() {
        let status = SlotStatus::default();
        status.flag_for_upload();
        assert!(status.take_upload_flag());
        assert!(!status.take_upload_flag());
    }

    #[test]
    fn test_unassigned_world_has_no_blocks() {
        let world = GameWorld::new(2, 0, false).unwrap();
        assert!(world.peek_block_from_pos(Point3::new(1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_assigned_but_ungenerated_slot_is_a_miss() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        world.assign_slot(0, ChunkPosition::new(0, 0));
        assert!(world.peek_block_from_pos(Point3::new(1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_vertical_bounds() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        world.generate_chunk(0, 0, 0);

        assert!(world.peek_block_from_pos(Point3::new(1.0, -0.5, 1.0)).is_none());
        assert!(world
            .peek_block_from_pos(Point3::new(1.0, CHUNK_SY as f32, 1.0))
            .is_none());
        assert!(world
            .peek_block_from_pos(Point3::new(1.0, CHUNK_SY as f32 - 0.5, 1.0))
            .is_some());
    }

    #[test]
    fn test_handle_reports_floored_voxel() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        world.generate_chunk(0, -(CHUNK_SX as i32), 0);

        let handle = world
            .peek_block_from_pos(Point3::new(-0.25, 3.75, CHUNK_SZ as f32 - 0.5))
            .unwrap();
        assert_eq!(handle.voxel, Point3::new(-1, 3, CHUNK_SZ as i32 - 1));
        assert_eq!(handle.index, Chunk::index(CHUNK_SX - 1, 3, CHUNK_SZ - 1));
    }

    #[test]
    fn test_adjacent_chunks_split_at_border() {
        let mut world = GameWorld::new(2, 0, false).unwrap();
        world.generate_chunk(0, 0, 0);
        world.generate_chunk(1, CHUNK_SX as i32, 0);

        let border = CHUNK_SX as f32;
        let east = world
            .peek_block_from_pos(Point3::new(border, 0.5, 3.5))
            .unwrap();
        assert_eq!(east.slot, 1);
        assert_eq!(east.chunk, ChunkPosition::new(CHUNK_SX as i32, 0));
        assert_eq!(east.voxel, Point3::new(CHUNK_SX as i32, 0, 3));
        assert_eq!(east.index, Chunk::index(0, 0, 3));

        let west = world
            .peek_block_from_pos(Point3::new(border - 0.01, 0.5, 3.5))
            .unwrap();
        assert_eq!(west.slot, 0);
        assert_eq!(west.chunk, ChunkPosition::new(0, 0));
        assert_eq!(west.voxel, Point3::new(CHUNK_SX as i32 - 1, 0, 3));
    }

    #[test]
    fn test_points_outside_live_chunks_miss() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        world.generate_chunk(0, 0, 0);

        let misses = [
            Point3::new(CHUNK_SX as f32, 0.5, 3.5),
            Point3::new(3.5, 0.5, CHUNK_SZ as f32),
            Point3::new(3.5, 0.5, -0.01),
            Point3::new(-0.01, 0.5, 3.5),
        ];
        for pos in misses {
            assert!(world.peek_block_from_pos(pos).is_none(), "{:?} resolved", pos);
        }
        assert!(world.peek_block_from_pos(Point3::new(0.0, 0.5, 0.0)).is_some());
    }

    #[test]
    fn test_zero_direction_ray_misses() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        world.generate_chunk(0, 0, 0);
        let hit = world.peek_block_from_ray(Point3::new(4.0, 1.0, 4.0), Vector3::new(0.0, 0.0, 0.0), 10.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_edit_through_stale_handle_is_rejected() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        world.generate_chunk(0, 0, 0);
        let handle = world.peek_block_from_pos(Point3::new(1.0, 0.0, 1.0)).unwrap();

        world.generate_chunk(0, CHUNK_SX as i32, 0);
        assert!(!world.edit_block(handle.slot, handle.chunk, handle.index, BlockType::AIR));
        assert!(world.block(&handle).is_none());
    }

    #[test]
    fn test_edit_flags_upload() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        world.generate_chunk(0, 0, 0);
        world.slot(0).status.take_upload_flag();

        let handle = world.peek_block_from_pos(Point3::new(1.0, 0.0, 1.0)).unwrap();
        assert!(world.edit_block(handle.slot, handle.chunk, handle.index, BlockType::AIR));
        assert!(world.slot(0).status.needs_upload());
        assert_eq!(world.block(&handle).unwrap().block_type, BlockType::AIR);
    }
}
