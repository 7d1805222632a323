//! # Block Editing
//!
//! Destroying and placing blocks along the camera ray.
//!
//! An edit finds the look-at block with `GameWorld::peek_block_from_ray`, writes the owning
//! chunk in place, rebuilds its mesh on the calling thread and uploads it straight away, so
//! the change is visible in the same frame. Edits never cross a chunk border: placing
//! against a face whose neighbour lies in another chunk is a miss.

use cgmath::{Point3, Vector3};
use log::debug;

use crate::engine_state::{
    rendering::InstanceUploader,
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::Chunk,
        world::GameWorld,
    },
};

/// Tolerance used when deciding which face of a block a ray entered through.
pub const FACE_EPSILON: f32 = 0.001;

/// The block type written by `EditAction::Place`.
pub const PLACED_BLOCK: BlockType = BlockType::STONE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Turn the look-at block into air
    Attack,
    /// Put a block against the struck face of the look-at block
    Place,
}

/// The block an edit changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditOutcome {
    pub slot: usize,
    pub index: usize,
    pub voxel: Point3<i32>,
    pub block_type: BlockType,
}

/// Finds the face of the unit cube at `block` through which the ray enters.
///
/// The ray is intersected with the cube using the slab method and the entry point is
/// compared against each face plane in turn.
///
/// # Returns
/// `None` if the entry point is not within `FACE_EPSILON` of any face
pub fn classify_struck_face(
    origin: Point3<f32>,
    direction: Vector3<f32>,
    block: Point3<i32>,
) -> Option<BlockSide> {
    let min = Point3::new(block.x as f32, block.y as f32, block.z as f32);

    let mut t_min = f32::NEG_INFINITY;
    for axis in 0..3 {
        // an origin on a face plane would give 0 * inf = NaN
        if direction[axis] == 0.0 {
            continue;
        }
        let inverse = 1.0 / direction[axis];
        let t1 = (min[axis] - origin[axis]) * inverse;
        let t2 = (min[axis] + 1.0 - origin[axis]) * inverse;
        t_min = t_min.max(t1.min(t2));
    }
    if !t_min.is_finite() {
        return None;
    }

    let hit = origin + direction * t_min;
    let rel = hit - min;

    if rel.y > 1.0 - FACE_EPSILON {
        Some(BlockSide::TOP)
    } else if rel.y < FACE_EPSILON {
        Some(BlockSide::BOTTOM)
    } else if rel.z < FACE_EPSILON {
        Some(BlockSide::FRONT)
    } else if rel.z > 1.0 - FACE_EPSILON {
        Some(BlockSide::BACK)
    } else if rel.x < FACE_EPSILON {
        Some(BlockSide::LEFT)
    } else if rel.x > 1.0 - FACE_EPSILON {
        Some(BlockSide::RIGHT)
    } else {
        None
    }
}

/// Applies an edit along a ray, then remeshes and re-uploads the touched chunk.
///
/// # Arguments
/// * `world` - The world to edit
/// * `uploader` - Receives the rebuilt chunk
/// * `action` - Attack or place
/// * `origin` - Ray origin, normally the camera position
/// * `direction` - Ray direction, normally the look direction
/// * `max_distance` - Reach of the ray
///
/// # Returns
/// The changed block, or `None` on a miss: nothing in reach, no face classified, a
/// neighbour across a chunk border, or the chunk busy with a worker
pub fn apply_edit(
    world: &GameWorld,
    uploader: &mut dyn InstanceUploader,
    action: EditAction,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<EditOutcome> {
    let hit = world.peek_block_from_ray(origin, direction, max_distance)?;

    let (index, voxel, block_type) = match action {
        EditAction::Attack => (hit.index, hit.voxel, BlockType::AIR),
        EditAction::Place => {
            let side = classify_struck_face(origin, direction, hit.voxel)?;
            let Some(index) = Chunk::neighbor_index(hit.index, side) else {
                debug!(
                    "Placement on the {:?} face of {:?} crosses a chunk border, ignored",
                    side, hit.voxel
                );
                return None;
            };
            let normal = side.normal();
            let voxel = Point3::new(hit.voxel.x + normal.x, hit.voxel.y + normal.y, hit.voxel.z + normal.z);
            (index, voxel, PLACED_BLOCK)
        }
    };

    if !world.edit_block(hit.slot, hit.chunk, index, block_type) {
        return None;
    }
    world.upload_slot(hit.slot, uploader);

    debug!("{:?} set {:?} to {:?}", action, voxel, block_type);
    Some(EditOutcome {
        slot: hit.slot,
        index,
        voxel,
        block_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_from_above_enters_top() {
        let side = classify_struck_face(
            Point3::new(2.5, 10.0, 2.5),
            Vector3::new(0.0, -1.0, 0.0),
            Point3::new(2, 4, 2),
        );
        assert_eq!(side, Some(BlockSide::TOP));
    }

    #[test]
    fn test_horizontal_rays() {
        let block = Point3::new(0, 0, 0);
        let cases = [
            (Point3::new(0.5, 0.5, -3.0), Vector3::new(0.0, 0.0, 1.0), BlockSide::FRONT),
            (Point3::new(0.5, 0.5, 4.0), Vector3::new(0.0, 0.0, -1.0), BlockSide::BACK),
            (Point3::new(-3.0, 0.5, 0.5), Vector3::new(1.0, 0.0, 0.0), BlockSide::LEFT),
            (Point3::new(4.0, 0.5, 0.5), Vector3::new(-1.0, 0.0, 0.0), BlockSide::RIGHT),
            (Point3::new(0.5, -3.0, 0.5), Vector3::new(0.0, 1.0, 0.0), BlockSide::BOTTOM),
        ];

        for (origin, direction, expected) in cases {
            assert_eq!(classify_struck_face(origin, direction, block), Some(expected));
        }
    }

    #[test]
    fn test_axis_aligned_ray_along_block_edge() {
        let block = Point3::new(0, 4, 0);
        let down = Vector3::new(0.0, -1.0, 0.0);

        assert_eq!(
            classify_struck_face(Point3::new(0.0, 10.0, 0.5), down, block),
            Some(BlockSide::TOP)
        );
        assert_eq!(
            classify_struck_face(Point3::new(0.0, 10.0, 0.0), down, block),
            Some(BlockSide::TOP)
        );
    }

    #[test]
    fn test_zero_direction_has_no_face() {
        let side = classify_struck_face(
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(0.0, 0.0, 0.0),
            Point3::new(0, 0, 0),
        );
        assert_eq!(side, None);
    }
}
