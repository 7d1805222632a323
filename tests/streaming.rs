mod common;

use cgmath::Point3;
use common::RecordingUploader;
use cubes_engine::engine_state::{
    task_management::TaskProcessor,
    voxels::{
        chunk::{ChunkPosition, CHUNK_SX},
        streaming::{ChunkStreamer, StreamingReport},
        world::GameWorld,
    },
};

fn chunks(n: i32) -> i32 {
    n * CHUNK_SX as i32
}

#[test]
fn test_populate_fills_every_slot() {
    let mut world = GameWorld::new(9, 3, true).unwrap();
    let mut streamer = ChunkStreamer::new(&world, 1, 2).unwrap();
    let mut uploader = RecordingUploader::default();

    streamer.populate(&mut world, Point3::new(8.0, 30.0, 8.0), &mut uploader);

    assert_eq!(uploader.uploaded_slots(), (0..9).collect::<Vec<_>>());
    assert!(uploader.uploads.iter().all(|(_, _, faces)| !faces.is_empty()));
    for slot in 0..9 {
        let position = world.assignment(slot).unwrap();
        assert!(position.is_within_radius(ChunkPosition::new(0, 0), 1));
        assert!(!world.slot(slot).status.is_pending());
    }
    assert_eq!(streamer.view_chunk(), Some(ChunkPosition::new(0, 0)));
}

#[test]
fn test_moving_one_chunk_reassigns_the_trailing_column() {
    let mut world = GameWorld::new(9, 3, false).unwrap();
    let mut streamer = ChunkStreamer::new(&world, 1, 2).unwrap();
    let mut uploader = RecordingUploader::default();
    streamer.populate(&mut world, Point3::new(8.0, 30.0, 8.0), &mut uploader);
    uploader.uploads.clear();

    let report = streamer.update_view(&mut world, Point3::new(chunks(1) as f32 + 8.0, 30.0, 8.0));
    assert_eq!(
        report,
        StreamingReport {
            reassigned: 3,
            resubmitted: 0,
            skipped: 0,
        }
    );

    let center = ChunkPosition::new(chunks(1), 0);
    for target in ChunkStreamer::target_positions(center, 1) {
        assert!(world.slot_assigned_to(target).is_some(), "{:?} unassigned", target);
    }
    assert!(world.slot_assigned_to(ChunkPosition::new(chunks(-1), 0)).is_none());

    streamer.wait_until_idle();
    let uploaded: Vec<usize> = (0..world.slot_count())
        .filter_map(|_| streamer.upload_next(&world, &mut uploader))
        .collect();
    assert_eq!(uploaded.len(), 3);
    assert!(uploader
        .uploads
        .iter()
        .all(|(_, origin, _)| origin.x == chunks(2)));
}

#[test]
fn test_targets_without_a_free_slot_are_skipped() {
    let mut world = GameWorld::new(4, 0, false).unwrap();
    let mut streamer = ChunkStreamer::new(&world, 1, 0).unwrap();

    let report = streamer.update_view(&mut world, Point3::new(8.0, 0.0, 8.0));

    assert_eq!(report.reassigned, 4);
    assert_eq!(report.skipped, 5);
    assert_eq!(streamer.queue().snapshot().task_count, 4);
}

#[test]
fn test_pending_slots_are_resubmitted_after_a_move() {
    let mut world = GameWorld::new(9, 0, false).unwrap();
    // No workers, so nothing is ever generated.
    let mut streamer = ChunkStreamer::new(&world, 1, 0).unwrap();

    let first = streamer.update_view(&mut world, Point3::new(8.0, 0.0, 8.0));
    assert_eq!(first.reassigned, 9);

    let second = streamer.update_view(&mut world, Point3::new(chunks(1) as f32 + 8.0, 0.0, 8.0));
    assert_eq!(second.resubmitted, 6);
    assert_eq!(second.reassigned, 3);
    assert_eq!(streamer.queue().snapshot().task_count, 9);
}

#[test]
fn test_stale_generation_is_dropped() {
    let mut world = GameWorld::new(1, 0, false).unwrap();
    let processor = world.generation_processor();

    let stale = world.assign_slot(0, ChunkPosition::new(0, 0));
    let current = world.assign_slot(0, ChunkPosition::new(chunks(4), chunks(-2)));

    processor.process(stale);
    assert!(!world.slot(0).chunk.get().generated);
    assert!(world.slot(0).status.is_pending());

    processor.process(current);
    let chunk = world.slot(0).chunk.get();
    assert!(chunk.generated);
    assert_eq!(chunk.position, current.position());
    assert!(!world.slot(0).status.is_pending());
    assert!(world.slot(0).status.needs_upload());
}

#[test]
fn test_upload_walks_slots_round_robin() {
    let mut world = GameWorld::new(3, 0, false).unwrap();
    world.generate_chunk(0, 0, 0);
    world.generate_chunk(2, chunks(1), 0);

    let mut streamer = ChunkStreamer::new(&world, 0, 0).unwrap();
    let mut uploader = RecordingUploader::default();

    assert_eq!(streamer.upload_next(&world, &mut uploader), Some(0));
    assert_eq!(streamer.upload_next(&world, &mut uploader), None);
    assert_eq!(streamer.upload_next(&world, &mut uploader), Some(2));
    assert_eq!(streamer.upload_next(&world, &mut uploader), None);
    assert_eq!(uploader.uploads.len(), 2);
}
