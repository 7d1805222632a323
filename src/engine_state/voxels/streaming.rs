//! # Chunk Streaming
//!
//! `ChunkStreamer` keeps the world's slots assigned to the `(2R+1)²` chunk positions around
//! the viewpoint and feeds the worker pool with the generation work that follows.
//!
//! ## Scheduling Policy
//!
//! When the viewpoint crosses into a new chunk:
//!
//! 1. The work queue is cleared; tasks nobody has claimed yet are dropped
//! 2. Slots whose latest assignment was never generated are resubmitted
//! 3. For each target position not already assigned, the first slot that is unassigned or
//!    outside the radius is reassigned and a task submitted. With no such slot the target is
//!    skipped until the next move
//!
//! ## Upload
//!
//! Finished chunks are uploaded by the main thread, one slot per frame, walking the slots
//! round-robin. A slot that is flagged but currently locked keeps its flag and is picked up
//! on a later lap.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, warn};

use crate::{
    core::EngineError,
    engine_state::{
        rendering::InstanceUploader,
        task_management::{WorkQueue, WorkerPool},
        voxels::{
            chunk::ChunkPosition, tasks::chunk_generation_task::ChunkGenerationTask,
            world::GameWorld,
        },
    },
};

/// What one call to `ChunkStreamer::update_view` did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamingReport {
    /// Slots reassigned to a new position
    pub reassigned: usize,
    /// Pending assignments submitted again
    pub resubmitted: usize,
    /// Target positions left without a slot this time
    pub skipped: usize,
}

/// The streaming scheduler: work queue, worker pool and the main-thread bookkeeping.
pub struct ChunkStreamer {
    render_distance: u32,
    queue: Arc<WorkQueue<ChunkGenerationTask>>,
    pool: WorkerPool<ChunkGenerationTask>,
    view_chunk: Option<ChunkPosition>,
    upload_cursor: usize,
}

impl ChunkStreamer {
    /// Creates the queue and starts the worker pool over the world's slots.
    ///
    /// # Arguments
    /// * `world` - The world whose slots the workers fill
    /// * `render_distance` - Streaming radius `R`, in chunks
    /// * `worker_threads` - Number of worker threads
    pub fn new(
        world: &GameWorld,
        render_distance: u32,
        worker_threads: usize,
    ) -> Result<Self, EngineError> {
        // One resubmission plus one new assignment per slot, at most.
        let queue = Arc::new(WorkQueue::new(world.slot_count() * 2));
        let pool = WorkerPool::new(
            worker_threads,
            queue.clone(),
            Arc::new(world.generation_processor()),
        )?;

        Ok(Self {
            render_distance,
            queue,
            pool,
            view_chunk: None,
            upload_cursor: 0,
        })
    }

    pub fn render_distance(&self) -> u32 {
        self.render_distance
    }

    pub fn queue(&self) -> &WorkQueue<ChunkGenerationTask> {
        &self.queue
    }

    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// The chunk the viewpoint was in at the last update.
    pub fn view_chunk(&self) -> Option<ChunkPosition> {
        self.view_chunk
    }

    /// Every chunk position within the radius of `center`, z-major then x.
    pub fn target_positions(center: ChunkPosition, radius: u32) -> Vec<ChunkPosition> {
        let radius = radius as i32;
        (-radius..=radius)
            .flat_map(|dz| (-radius..=radius).map(move |dx| center.offset_by_chunks(dx, dz)))
            .collect()
    }

    fn submit(&self, task: ChunkGenerationTask) {
        if let Err(task) = self.queue.add_task(task) {
            warn!(
                "Work queue full, slot {} stays pending until the next move",
                task.slot
            );
        }
    }

    /// Fills every slot around `center` and blocks until all of it is generated and uploaded.
    ///
    /// # Arguments
    /// * `world` - The world to populate
    /// * `center` - World position of the viewpoint
    /// * `uploader` - Receives every generated chunk
    pub fn populate(
        &mut self,
        world: &mut GameWorld,
        center: Point3<f32>,
        uploader: &mut dyn InstanceUploader,
    ) {
        let center_chunk = ChunkPosition::containing(center.x, center.z);
        let targets = Self::target_positions(center_chunk, self.render_distance);
        if targets.len() > world.slot_count() {
            warn!(
                "{} slots for {} streamed chunks; the outer ring stays empty",
                world.slot_count(),
                targets.len()
            );
        }

        for (slot, position) in targets.into_iter().take(world.slot_count()).enumerate() {
            let task = world.assign_slot(slot, position);
            self.submit(task);
        }

        self.queue.wait_and_clear();
        self.view_chunk = Some(center_chunk);

        let mut uploaded = 0;
        for slot in 0..world.slot_count() {
            if world.slot(slot).status.needs_upload() && world.upload_slot(slot, uploader) {
                uploaded += 1;
            }
        }
        info!("Initial population finished, {} chunks uploaded", uploaded);
    }

    /// Reassigns slots when the viewpoint has moved into a different chunk.
    ///
    /// # Arguments
    /// * `world` - The world whose assignments change
    /// * `view` - World position of the viewpoint
    ///
    /// # Returns
    /// What was scheduled; all zero when the view chunk did not change
    pub fn update_view(&mut self, world: &mut GameWorld, view: Point3<f32>) -> StreamingReport {
        let center = ChunkPosition::containing(view.x, view.z);
        if self.view_chunk == Some(center) {
            return StreamingReport::default();
        }
        self.view_chunk = Some(center);
        self.queue.clear_tasks();

        let radius = self.render_distance;
        let mut report = StreamingReport::default();

        for slot in 0..world.slot_count() {
            let Some(position) = world.assignment(slot) else {
                continue;
            };
            if position.is_within_radius(center, radius) && world.slot(slot).status.is_pending() {
                let task = world.assign_slot(slot, position);
                self.submit(task);
                report.resubmitted += 1;
            }
        }

        for target in Self::target_positions(center, radius) {
            if world.slot_assigned_to(target).is_some() {
                continue;
            }

            let evictable = (0..world.slot_count()).find(|&slot| {
                world
                    .assignment(slot)
                    .map_or(true, |position| !position.is_within_radius(center, radius))
            });

            match evictable {
                Some(slot) => {
                    let task = world.assign_slot(slot, target);
                    self.submit(task);
                    report.reassigned += 1;
                }
                None => report.skipped += 1,
            }
        }

        debug!("View moved to {:?}: {:?}", center, report);
        report
    }

    /// Looks at the next slot in round-robin order and uploads it if flagged.
    ///
    /// # Returns
    /// The uploaded slot, if any
    pub fn upload_next(
        &mut self,
        world: &GameWorld,
        uploader: &mut dyn InstanceUploader,
    ) -> Option<usize> {
        let slot_count = world.slot_count();
        if slot_count == 0 {
            return None;
        }

        let slot = self.upload_cursor % slot_count;
        self.upload_cursor = (slot + 1) % slot_count;

        (world.slot(slot).status.needs_upload() && world.upload_slot(slot, uploader)).then_some(slot)
    }

    /// Blocks until every queued task has run. The queue is left as is.
    pub fn wait_until_idle(&self) {
        self.queue.wait_until_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::{CHUNK_SX, CHUNK_SZ};

    #[test]
    fn test_targets_are_z_major() {
        let targets = ChunkStreamer::target_positions(ChunkPosition::new(0, 0), 1);
        assert_eq!(targets.len(), 9);
        assert_eq!(targets[0], ChunkPosition::new(-(CHUNK_SX as i32), -(CHUNK_SZ as i32)));
        assert_eq!(targets[1], ChunkPosition::new(0, -(CHUNK_SZ as i32)));
        assert_eq!(targets[8], ChunkPosition::new(CHUNK_SX as i32, CHUNK_SZ as i32));
    }

    #[test]
    fn test_same_chunk_does_nothing() {
        let mut world = GameWorld::new(1, 0, false).unwrap();
        let mut streamer = ChunkStreamer::new(&world, 0, 0).unwrap();

        let first = streamer.update_view(&mut world, Point3::new(1.0, 0.0, 1.0));
        assert_eq!(first.reassigned, 1);

        let second = streamer.update_view(&mut world, Point3::new(15.0, 0.0, 15.0));
        assert_eq!(second, StreamingReport::default());
    }
}
