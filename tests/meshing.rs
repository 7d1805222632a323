use cubes_engine::engine_state::voxels::{chunk::Chunk, world::GameWorld};

fn generated_world(seed: u32, world_x: i32, world_z: i32) -> GameWorld {
    let mut world = GameWorld::new(1, seed, true).unwrap();
    world.generate_chunk(0, world_x, world_z);
    world
}

#[test]
fn test_face_count_is_bounded_by_solid_blocks() {
    for (seed, x, z) in [(0, 0, 0), (11, -48, 32), (42, 160, -160)] {
        let world = generated_world(seed, x, z);
        let chunk = world.slot(0).chunk.get();

        let faces = chunk.mesh.visible_faces();
        assert!(!faces.is_empty());
        assert!(faces.len() <= 6 * chunk.solid_count());
    }
}

#[test]
fn test_generated_mesh_has_no_internal_faces() {
    let world = generated_world(5, 16, -16);
    let chunk = world.slot(0).chunk.get();

    for face in chunk.mesh.visible_faces() {
        let index = face.position as usize;
        assert!(!chunk.blocks[index].is_air());

        let side = face.side().unwrap();
        if let Some(neighbor) = Chunk::neighbor_index(index, side) {
            assert!(
                chunk.blocks[neighbor].is_air(),
                "face {:?} of block {} is covered",
                side,
                index
            );
        }
    }
}

#[test]
fn test_generation_depends_only_on_seed_and_position() {
    let first = generated_world(9, 64, 0);
    let mut second = GameWorld::new(1, 9, true).unwrap();
    second.generate_chunk(0, 0, 0);
    second.generate_chunk(0, 64, 0);

    let a = first.slot(0).chunk.get();
    let b = second.slot(0).chunk.get();
    assert_eq!(a.blocks, b.blocks);
    assert_eq!(a.mesh.visible_faces(), b.mesh.visible_faces());
}
