//! # Chunk Generation Task
//!
//! This module defines `ChunkGenerationTask`, the record the streaming scheduler puts on the
//! work queue when a slot is (re)assigned, and `ChunkGenerationProcessor`, which turns one
//! into terrain and a face mesh on a worker thread.
//!
//! ## Worker Sequence
//!
//! 1. Take the slot's write lock
//! 2. Drop the task if its ticket is no longer the slot's latest assignment
//! 3. Fill the block array and rebuild the mesh
//! 4. Record the ticket as fulfilled and release the lock
//! 5. Flag the slot for upload
//!
//! The upload flag is raised after the lock is released so that the main thread, which
//! clears the flag while holding the read lock, always sees the finished chunk.

use std::sync::Arc;

use log::debug;

use crate::engine_state::{
    task_management::TaskProcessor,
    voxels::{
        chunk::{terrain::TerrainGenerator, ChunkPosition},
        world::ChunkSlot,
    },
};

/// A request to fill one slot with the terrain at a chunk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGenerationTask {
    /// The slot to write into
    pub slot: usize,
    /// World x of the chunk's minimum corner
    pub world_x: i32,
    /// World z of the chunk's minimum corner
    pub world_z: i32,
    /// The slot assignment this task was issued for
    pub ticket: u64,
}

impl ChunkGenerationTask {
    /// The chunk position this task generates.
    pub fn position(&self) -> ChunkPosition {
        ChunkPosition::new(self.world_x, self.world_z)
    }
}

/// Shared by every worker; holds the slot handles and the terrain noise.
pub struct ChunkGenerationProcessor {
    slots: Vec<ChunkSlot>,
    terrain: Arc<TerrainGenerator>,
    occlusion_shading: bool,
}

impl ChunkGenerationProcessor {
    /// Creates a processor over the given slots.
    ///
    /// # Arguments
    /// * `slots` - Handles to the world's slots, indexed like the world's own array
    /// * `terrain` - The world's terrain generator
    /// * `occlusion_shading` - Whether generated blocks get occlusion brightness
    pub fn new(
        slots: Vec<ChunkSlot>,
        terrain: Arc<TerrainGenerator>,
        occlusion_shading: bool,
    ) -> Self {
        Self {
            slots,
            terrain,
            occlusion_shading,
        }
    }
}

impl TaskProcessor<ChunkGenerationTask> for ChunkGenerationProcessor {
    fn process(&self, task: ChunkGenerationTask) {
        let Some(slot) = self.slots.get(task.slot) else {
            debug!("Dropping generation task for unknown slot {}", task.slot);
            return;
        };

        {
            let mut chunk = slot.chunk.get_mut();

            if !slot.status.is_current(task.ticket) {
                debug!(
                    "Dropping stale generation of {:?} for slot {} (ticket {})",
                    task.position(),
                    task.slot,
                    task.ticket
                );
                return;
            }

            chunk.generate(&self.terrain, task.position(), self.occlusion_shading);
            chunk.remesh();
            slot.status.mark_fulfilled(task.ticket);
        }

        slot.status.flag_for_upload();
    }
}
