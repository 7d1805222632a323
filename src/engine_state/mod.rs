//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - Manages GPU buffers for rendering
//! * `camera_state` - Handles camera positioning and movement
//! * `rendering` - Contains rendering systems and pipelines
//! * `task_management` - The work queue and worker pool behind chunk streaming
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Architecture
//!
//! `EngineState` owns every subsystem and is passed explicitly; there is no global state.
//! Each frame the application shell calls, in order:
//!
//! 1. `set_input_commands` with the frame's input snapshot
//! 2. `process_input` to move the camera, stream chunks and apply edits
//! 3. `update` to upload one pending chunk and refresh the look-at block
//! 4. `render` to plan and draw the frame
//!
//! ## Performance Considerations
//!
//! * Chunk generation and meshing run on the worker pool; the main thread never blocks on
//!   a chunk lock
//! * At most one streamed chunk is uploaded per frame; edits upload their chunk immediately

use std::path::Path;

use camera_state::{
    camera::{Projection, Z_FAR, Z_NEAR},
    CameraState, CameraUpdates,
};
use cgmath::{Deg, Point3};
use log::{debug, info};
use rendering::{FrameInputs, FramePlan, Renderer, SceneLighting};
use voxels::{
    edit::{apply_edit, EditAction},
    streaming::ChunkStreamer,
    world::GameWorld,
};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    application_state::input_state::ProcessedInputState,
    core::{EngineConfig, EngineError},
};

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine
///
/// This struct owns all major subsystems and coordinates their interactions. It handles
/// input processing, chunk streaming, block edits and rendering.
pub struct EngineState {
    pub config: EngineConfig,
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// The voxel world containing all chunk slots
    pub world: GameWorld,
    /// Keeps the slots around the camera generated
    pub streamer: ChunkStreamer,
    /// Surface, pipelines and GPU buffers
    pub renderer: Renderer,
    /// The block under the crosshair, refreshed every update
    look_at: Option<Point3<i32>>,
    cursor_locked: bool,
    /// Start of the day/night clock
    clock: web_time::Instant,
}

impl EngineState {
    /// Creates the engine and fills the world around the start position.
    ///
    /// Blocks until the initial chunks are generated and uploaded.
    ///
    /// # Arguments
    ///
    /// * `surface` - The rendering surface, already configured
    /// * `surface_config` - Configuration for the rendering surface
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    /// * `config` - Engine configuration
    ///
    /// # Returns
    ///
    /// An error if the world cannot be allocated, the workers cannot be spawned, or an asset
    /// fails to load
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let seed = config.resolve_seed();
        info!(
            "Starting world with seed {} and render distance {}",
            seed, config.render_distance
        );

        let camera_projection = Projection::new(
            surface_config.width,
            surface_config.height,
            Deg(config.field_of_view),
            Z_NEAR,
            Z_FAR,
        );

        let mut world = GameWorld::new(config.slot_count(), seed, config.occlusion_shading)?;
        let mut renderer = Renderer::new(
            surface,
            surface_config,
            device,
            queue,
            camera_projection,
            world.slot_count(),
            Path::new(&config.asset_dir),
        )?;
        let mut streamer =
            ChunkStreamer::new(&world, config.render_distance, config.worker_threads)?;
        info!(
            "Streaming radius {} with {} chunk workers",
            streamer.render_distance(),
            streamer.worker_count()
        );

        let camera_state = CameraState::new(&config);
        streamer.populate(
            &mut world,
            camera_state.camera.position,
            &mut renderer.buffer_state,
        );
        info!(
            "GPU buffers: {} bytes allocated, {} bytes in use",
            renderer.buffer_state.get_total_allocated_memory(),
            renderer.buffer_state.get_total_used_memory()
        );

        Ok(Self {
            config,
            camera_state,
            player_actions: PlayerAction::default(),
            world,
            streamer,
            renderer,
            look_at: None,
            cursor_locked: false,
            clock: web_time::Instant::now(),
        })
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize_surface(size);
    }

    pub fn cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Sets the input commands for the next `process_input`.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = PlayerAction::from_input(&input, self.cursor_locked);
    }

    /// Applies the current player actions.
    ///
    /// Moves the camera, reschedules streaming when the camera crossed into another chunk,
    /// and performs at most one attack and one place.
    ///
    /// # Arguments
    ///
    /// * `wait_duration` - The time elapsed since the last frame
    ///
    /// # Returns
    ///
    /// `true` if the cursor lock was toggled and the window needs to follow
    pub fn process_input(&mut self, wait_duration: web_time::Duration) -> bool {
        self.camera_state.intake_actions(&self.player_actions);

        if let Some(CameraUpdates { new_chunk_position }) = self.camera_state.update(wait_duration) {
            if self.streamer.view_chunk() != Some(new_chunk_position) {
                let report = self
                    .streamer
                    .update_view(&mut self.world, self.camera_state.camera.position);
                debug!("Streaming report: {:?}", report);
            }
        }

        let actions = [
            (self.player_actions.attack, EditAction::Attack),
            (self.player_actions.place, EditAction::Place),
        ];
        for (requested, action) in actions {
            if !requested {
                continue;
            }
            let camera = &self.camera_state.camera;
            let outcome = apply_edit(
                &self.world,
                &mut self.renderer.buffer_state,
                action,
                camera.position,
                camera.look_direction(),
                self.config.max_ray_distance,
            );
            if outcome.is_none() {
                debug!("{:?} missed", action);
            }
        }

        if self.player_actions.toggle_cursor_lock {
            self.cursor_locked = !self.cursor_locked;
            info!("Cursor lock {}", if self.cursor_locked { "on" } else { "off" });
            return true;
        }
        false
    }

    /// Per-frame world upkeep: one round-robin chunk upload and the look-at query.
    pub fn update(&mut self) {
        self.streamer
            .upload_next(&self.world, &mut self.renderer.buffer_state);

        let camera = &self.camera_state.camera;
        self.look_at = self
            .world
            .peek_block_from_ray(
                camera.position,
                camera.look_direction(),
                self.config.max_ray_distance,
            )
            .map(|handle| handle.voxel);
    }

    /// Plans and draws one frame.
    ///
    /// # Arguments
    ///
    /// * `size` - Current window size; the surface is resized first if it changed
    pub fn render(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        let surface_config = &self.renderer.surface_config;
        if size.width != surface_config.width || size.height != surface_config.height {
            self.renderer.resize_surface(size);
        }

        let plan = self.plan_frame();
        self.renderer.render(&plan);
    }

    /// Builds the frame plan for the current world, camera and time of day.
    pub fn plan_frame(&self) -> FramePlan {
        let lighting = SceneLighting::at(self.clock.elapsed().as_secs_f32(), self.config.day_speed);
        let uploaded = self.renderer.buffer_state.uploaded_chunks();

        FramePlan::build(&FrameInputs {
            view_proj: self.camera_state.view_proj(&self.renderer.camera_projection),
            camera_position: self.camera_state.camera.position,
            lighting: &lighting,
            uploaded: &uploaded,
            world: &self.world,
            look_at: self.look_at,
            aspect: self.renderer.aspect(),
        })
    }
}

/// Represents player actions derived from input
///
/// Movement flags are true while the key is held; edits and the cursor toggle fire once
/// per press.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerAction {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,

    /// Mouse motion this frame, only while the cursor is locked
    pub rotate_view: Option<(f64, f64)>,

    pub attack: bool,
    pub place: bool,
    pub toggle_cursor_lock: bool,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    ///
    /// # Arguments
    /// * `input` - The processed input state to translate
    /// * `cursor_locked` - Whether mouse motion should turn the camera
    pub fn from_input(input: &ProcessedInputState, cursor_locked: bool) -> Self {
        Self {
            move_forward: input.get_key_state(KeyCode::KeyW).is_active(),
            move_backward: input.get_key_state(KeyCode::KeyS).is_active(),
            move_left: input.get_key_state(KeyCode::KeyA).is_active(),
            move_right: input.get_key_state(KeyCode::KeyD).is_active(),
            move_up: input.get_key_state(KeyCode::Space).is_active(),
            move_down: input.get_key_state(KeyCode::ShiftLeft).is_active(),
            rotate_view: input.get_mouse_delta().filter(|_| cursor_locked),
            attack: input
                .get_mouse_button_state(MouseButton::Left)
                .is_just_pressed(),
            place: input
                .get_mouse_button_state(MouseButton::Right)
                .is_just_pressed(),
            toggle_cursor_lock: input.get_key_state(KeyCode::Tab).is_just_pressed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_state::input_state::RawInputState;

    #[test]
    fn test_mouse_look_requires_cursor_lock() {
        let input = ProcessedInputState {
            mouse_delta: Some((3.0, 4.0)),
            ..Default::default()
        };

        assert_eq!(PlayerAction::from_input(&input, false).rotate_view, None);
        assert_eq!(
            PlayerAction::from_input(&input, true).rotate_view,
            Some((3.0, 4.0))
        );
    }

    #[test]
    fn test_edits_fire_on_press_only() {
        let mut input = ProcessedInputState::default();
        input
            .mouse_button_states
            .insert(MouseButton::Left, RawInputState::Pressed);
        input
            .mouse_button_states
            .insert(MouseButton::Right, RawInputState::Held);
        input.keyboard_states.insert(KeyCode::KeyW, RawInputState::Held);

        let actions = PlayerAction::from_input(&input, false);
        assert!(actions.attack);
        assert!(!actions.place);
        assert!(actions.move_forward);
        assert!(!actions.toggle_cursor_lock);
    }
}
