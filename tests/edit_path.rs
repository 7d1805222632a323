mod common;

use cgmath::{Point3, Vector3};
use common::RecordingUploader;
use cubes_engine::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{Chunk, CHUNK_LAYER_STRIDE, CHUNK_SX},
    edit::{apply_edit, EditAction, PLACED_BLOCK},
    world::GameWorld,
};

const REACH: f32 = 64.0;

fn down() -> Vector3<f32> {
    Vector3::new(0.0, -1.0, 0.0)
}

fn generated_world() -> GameWorld {
    let mut world = GameWorld::new(1, 0, false).unwrap();
    world.generate_chunk(0, 0, 0);
    world
}

#[test]
fn test_generated_origin_chunk_has_faces() {
    let world = generated_world();
    let chunk = world.slot(0).chunk.get();

    assert!(chunk.generated);
    assert!(chunk.solid_count() > 0);
    assert!(!chunk.mesh.visible_faces().is_empty());
}

#[test]
fn test_downward_ray_finds_column_top() {
    let world = generated_world();
    let hit = world
        .peek_block_from_ray(Point3::new(3.5, 100.0, 7.5), down(), 200.0)
        .unwrap();

    assert_eq!((hit.voxel.x, hit.voxel.z), (3, 7));
    let chunk = world.slot(0).chunk.get();
    let above = Chunk::local_index(3, hit.voxel.y + 1, 7).unwrap();
    assert!(chunk.blocks[above].is_air());
    assert!(!chunk.blocks[hit.index].is_air());
}

#[test]
fn test_attack_clears_block_and_uploads_once() {
    let world = generated_world();
    let mut uploader = RecordingUploader::default();
    let origin = Point3::new(5.5, 40.0, 5.5);

    let target = world.peek_block_from_ray(origin, down(), REACH).unwrap();
    let outcome = apply_edit(&world, &mut uploader, EditAction::Attack, origin, down(), REACH).unwrap();

    assert_eq!(outcome.voxel, target.voxel);
    assert_eq!(outcome.block_type, BlockType::AIR);
    assert_eq!(world.block(&target).unwrap().block_type, BlockType::AIR);

    assert_eq!(uploader.uploads.len(), 1);
    let (slot, _, faces) = &uploader.uploads[0];
    assert_eq!(*slot, 0);
    assert!(faces
        .iter()
        .all(|face| face.position as usize != target.index));
    assert!(!world.slot(0).status.needs_upload());
}

#[test]
fn test_place_on_top_fills_block_above() {
    let world = generated_world();
    let mut uploader = RecordingUploader::default();
    let origin = Point3::new(9.5, 40.0, 2.5);

    let target = world.peek_block_from_ray(origin, down(), REACH).unwrap();
    let outcome = apply_edit(&world, &mut uploader, EditAction::Place, origin, down(), REACH).unwrap();

    assert_eq!(outcome.index, target.index + CHUNK_LAYER_STRIDE);
    assert_eq!(outcome.voxel, Point3::new(9, target.voxel.y + 1, 2));
    assert_eq!(world.slot(0).chunk.get().blocks[outcome.index].block_type, PLACED_BLOCK);
    assert_eq!(uploader.uploads.len(), 1);

    // The new block is now the first thing the same ray meets.
    let next = world.peek_block_from_ray(origin, down(), REACH).unwrap();
    assert_eq!(next.voxel, outcome.voxel);
}

#[test]
fn test_place_across_chunk_border_is_ignored() {
    let world = generated_world();
    let mut uploader = RecordingUploader::default();

    let edge_x = CHUNK_SX as f32 - 0.5;
    let top = world
        .peek_block_from_ray(Point3::new(edge_x, 40.0, 5.5), down(), REACH)
        .unwrap();

    // Aim at the +x face of the edge block from outside the chunk.
    let origin = Point3::new(edge_x + 5.0, top.voxel.y as f32 + 0.5, 5.5);
    let direction = Vector3::new(-1.0, 0.0, 0.0);
    let hit = world.peek_block_from_ray(origin, direction, REACH).unwrap();
    assert_eq!(hit.voxel, top.voxel);

    let outcome = apply_edit(&world, &mut uploader, EditAction::Place, origin, direction, REACH);
    assert!(outcome.is_none());
    assert!(uploader.uploads.is_empty());
    assert_eq!(world.block(&hit), Some(hit.block));
}

#[test]
fn test_miss_changes_nothing() {
    let world = generated_world();
    let mut uploader = RecordingUploader::default();

    let outcome = apply_edit(
        &world,
        &mut uploader,
        EditAction::Attack,
        Point3::new(5.5, 40.0, 5.5),
        Vector3::new(0.0, 1.0, 0.0),
        REACH,
    );

    assert!(outcome.is_none());
    assert!(uploader.uploads.is_empty());
}
