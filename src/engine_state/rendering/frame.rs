//! Per-frame draw plan.
//!
//! `FramePlan::build` decides everything a frame draws, in order, without touching the
//! GPU. `PipelineManager::execute` then turns the plan into render passes. Keeping the two
//! apart lets the draw decisions (which chunks, which boxes, where the sun is) be checked
//! in plain tests.
//!
//! ## Frame Order
//!
//! 1. Shadow depth pass over every drawn chunk
//! 2. Sky clear
//! 3. Sun and moon billboards
//! 4. Chunk meshes
//! 5. Debug wireframes: chunk borders and the look-at highlight
//! 6. HUD

use cgmath::{Matrix4, Point3};

use super::{
    lighting::SceneLighting,
    ui,
    vertex::{SpriteInstance, UiQuadInstance, WireBoxInstance},
};
use crate::engine_state::voxels::{
    block::{MOON_TEXTURE_INDEX, SUN_TEXTURE_INDEX},
    chunk::{ChunkPosition, CHUNK_SX, CHUNK_SY, CHUNK_SZ},
    world::GameWorld,
};

/// Billboard size in world units.
pub const BILLBOARD_SCALE: f32 = 0.3;
/// Scale of the look-at wireframe relative to a block.
pub const HIGHLIGHT_SCALE: f32 = 1.01;
pub const CHUNK_BORDER_COLOR: [f32; 3] = [0.9, 0.9, 0.2];
pub const HIGHLIGHT_COLOR: [f32; 3] = [0.05, 0.05, 0.05];

/// A chunk whose faces are resident on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadedChunk {
    pub slot: usize,
    pub origin: ChunkPosition,
    pub face_count: u32,
}

/// Uniform data shared by every pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// Camera position; w unused
    pub camera_position: [f32; 4],
    /// Unit vector towards the active light; w unused
    pub light_direction: [f32; 4],
    /// Light colour in rgb, intensity in w
    pub light_color: [f32; 4],
    /// Sky colour in rgb, ambient factor in w
    pub sky_color: [f32; 4],
}

impl SceneUniform {
    pub fn new(
        view_proj: Matrix4<f32>,
        camera_position: Point3<f32>,
        lighting: &SceneLighting,
    ) -> Self {
        let light = lighting.light_direction();
        let [r, g, b] = lighting.light_color;
        let [sky_r, sky_g, sky_b] = lighting.sky_color;

        Self {
            view_proj: view_proj.into(),
            light_view_proj: lighting.light_view_proj(camera_position).into(),
            camera_position: [camera_position.x, camera_position.y, camera_position.z, 1.0],
            light_direction: [light.x, light.y, light.z, 0.0],
            light_color: [r, g, b, lighting.intensity],
            sky_color: [sky_r, sky_g, sky_b, lighting.ambient],
        }
    }
}

/// One step of a frame, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Render depth from the light over all chunk draws of the frame
    ShadowPass,
    /// Clear colour and depth
    ClearSky { color: [f32; 3] },
    Billboard(SpriteInstance),
    Chunk(UploadedChunk),
    WireBox(WireBoxInstance),
    Ui(UiQuadInstance),
}

/// What the world contributes to a frame.
pub struct FrameInputs<'a> {
    pub view_proj: Matrix4<f32>,
    pub camera_position: Point3<f32>,
    pub lighting: &'a SceneLighting,
    /// Every chunk currently resident on the GPU
    pub uploaded: &'a [UploadedChunk],
    pub world: &'a GameWorld,
    /// The block under the crosshair, if any
    pub look_at: Option<Point3<i32>>,
    /// Window width / height
    pub aspect: f32,
}

/// An ordered list of draw commands plus the scene uniform they share.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub scene: SceneUniform,
    pub commands: Vec<DrawCommand>,
}

impl FramePlan {
    /// Plans a frame.
    ///
    /// A chunk is drawn only if it has been uploaded and its slot has no newer content
    /// waiting to be uploaded.
    pub fn build(inputs: &FrameInputs) -> Self {
        let lighting = inputs.lighting;
        let chunks: Vec<UploadedChunk> = inputs
            .uploaded
            .iter()
            .filter(|chunk| chunk.face_count > 0)
            .filter(|chunk| {
                inputs
                    .world
                    .slots()
                    .get(chunk.slot)
                    .is_some_and(|slot| !slot.status.needs_upload())
            })
            .copied()
            .collect();

        let mut commands = Vec::with_capacity(4 + chunks.len() * 2 + 20);
        commands.push(DrawCommand::ShadowPass);
        commands.push(DrawCommand::ClearSky {
            color: lighting.sky_color,
        });

        let (sun, moon) = lighting.billboard_positions(inputs.camera_position);
        commands.push(DrawCommand::Billboard(SpriteInstance {
            center: sun.into(),
            scale: BILLBOARD_SCALE,
            tile: SUN_TEXTURE_INDEX as u32,
        }));
        commands.push(DrawCommand::Billboard(SpriteInstance {
            center: moon.into(),
            scale: BILLBOARD_SCALE,
            tile: MOON_TEXTURE_INDEX as u32,
        }));

        commands.extend(chunks.iter().copied().map(DrawCommand::Chunk));

        commands.extend(chunks.iter().map(|chunk| {
            DrawCommand::WireBox(WireBoxInstance {
                min: [chunk.origin.x as f32, 0.0, chunk.origin.z as f32],
                size: [CHUNK_SX as f32, CHUNK_SY as f32, CHUNK_SZ as f32],
                color: CHUNK_BORDER_COLOR,
            })
        }));
        if let Some(voxel) = inputs.look_at {
            commands.push(DrawCommand::WireBox(highlight_box(voxel)));
        }

        commands.extend(
            ui::hud_layout(inputs.aspect)
                .iter()
                .map(|rectangle| DrawCommand::Ui(rectangle.instance())),
        );

        Self {
            scene: SceneUniform::new(inputs.view_proj, inputs.camera_position, lighting),
            commands,
        }
    }

    /// The chunks this plan draws, in draw order.
    pub fn chunk_draws(&self) -> impl Iterator<Item = &UploadedChunk> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Chunk(chunk) => Some(chunk),
            _ => None,
        })
    }

    pub fn sky_color(&self) -> [f32; 3] {
        self.commands
            .iter()
            .find_map(|command| match command {
                DrawCommand::ClearSky { color } => Some(*color),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn billboards(&self) -> Vec<SpriteInstance> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Billboard(sprite) => Some(*sprite),
                _ => None,
            })
            .collect()
    }

    pub fn wire_boxes(&self) -> Vec<WireBoxInstance> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::WireBox(wire_box) => Some(*wire_box),
                _ => None,
            })
            .collect()
    }

    pub fn ui_quads(&self) -> Vec<UiQuadInstance> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Ui(quad) => Some(*quad),
                _ => None,
            })
            .collect()
    }
}

/// A box around `voxel`, grown about its center so it does not z-fight the block faces.
pub fn highlight_box(voxel: Point3<i32>) -> WireBoxInstance {
    let inset = (HIGHLIGHT_SCALE - 1.0) / 2.0;
    WireBoxInstance {
        min: [
            voxel.x as f32 - inset,
            voxel.y as f32 - inset,
            voxel.z as f32 - inset,
        ],
        size: [HIGHLIGHT_SCALE; 3],
        color: HIGHLIGHT_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    fn inputs<'a>(
        world: &'a GameWorld,
        lighting: &'a SceneLighting,
        uploaded: &'a [UploadedChunk],
        look_at: Option<Point3<i32>>,
    ) -> FrameInputs<'a> {
        FrameInputs {
            view_proj: Matrix4::identity(),
            camera_position: Point3::new(8.0, 30.0, 8.0),
            lighting,
            uploaded,
            world,
            look_at,
            aspect: 1.5,
        }
    }

    #[test]
    fn test_frame_order() {
        let world = GameWorld::new(1, 0, false).unwrap();
        let lighting = SceneLighting::at(1.0, 0.2);
        let uploaded = [UploadedChunk {
            slot: 0,
            origin: ChunkPosition::new(0, 0),
            face_count: 12,
        }];
        let plan = FramePlan::build(&inputs(&world, &lighting, &uploaded, Some(Point3::new(1, 2, 3))));

        assert_eq!(plan.commands[0], DrawCommand::ShadowPass);
        assert!(matches!(plan.commands[1], DrawCommand::ClearSky { .. }));
        assert!(matches!(plan.commands[2], DrawCommand::Billboard(_)));
        assert!(matches!(plan.commands[3], DrawCommand::Billboard(_)));
        assert_eq!(plan.commands[4], DrawCommand::Chunk(uploaded[0]));
        assert_eq!(plan.wire_boxes().len(), 2);
        assert!(matches!(plan.commands.last(), Some(DrawCommand::Ui(_))));
        assert_eq!(plan.ui_quads().len(), 2 + ui::INVENTORY_CELLS + ui::HEARTS);
    }

    #[test]
    fn test_dirty_and_empty_chunks_are_not_drawn() {
        let world = GameWorld::new(3, 0, false).unwrap();
        world.slot(1).status.flag_for_upload();
        let lighting = SceneLighting::at(0.0, 0.2);
        let uploaded = [
            UploadedChunk { slot: 0, origin: ChunkPosition::new(0, 0), face_count: 6 },
            UploadedChunk { slot: 1, origin: ChunkPosition::new(16, 0), face_count: 6 },
            UploadedChunk { slot: 2, origin: ChunkPosition::new(32, 0), face_count: 0 },
        ];
        let plan = FramePlan::build(&inputs(&world, &lighting, &uploaded, None));

        let drawn: Vec<usize> = plan.chunk_draws().map(|chunk| chunk.slot).collect();
        assert_eq!(drawn, vec![0]);
        assert_eq!(plan.wire_boxes().len(), 1);
    }

    #[test]
    fn test_billboards_use_sun_and_moon_tiles() {
        let world = GameWorld::new(0, 0, false).unwrap();
        let lighting = SceneLighting::at(2.0, 0.2);
        let plan = FramePlan::build(&inputs(&world, &lighting, &[], None));

        let billboards = plan.billboards();
        assert_eq!(billboards[0].tile, SUN_TEXTURE_INDEX as u32);
        assert_eq!(billboards[1].tile, MOON_TEXTURE_INDEX as u32);
        assert_eq!(plan.sky_color(), lighting.sky_color);
    }

    #[test]
    fn test_highlight_is_centered_on_voxel() {
        let wire_box = highlight_box(Point3::new(4, 5, 6));
        let center = [
            wire_box.min[0] + wire_box.size[0] / 2.0,
            wire_box.min[1] + wire_box.size[1] / 2.0,
            wire_box.min[2] + wire_box.size[2] / 2.0,
        ];
        for (actual, expected) in center.iter().zip([4.5, 5.5, 6.5]) {
            assert!((actual - expected).abs() < 1e-5);
        }
    }
}
