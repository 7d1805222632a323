//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera position and orientation tracking
//! - Player input processing for camera control
//! - Chunk-based position tracking for the streaming scheduler
//!
//! ## Core Components
//! - `Camera`: Represents the camera's position and orientation in 3D space
//! - `CameraController`: Handles player input and updates camera state
//! - `Projection`: Manages the camera's projection matrix
//!
//! The view-projection matrix is not uploaded here; it goes into the frame's scene uniform
//! together with the lighting.

use camera::{Camera, CameraController, Projection};
use cgmath::{Deg, Matrix4, Point3};

use crate::core::EngineConfig;

use super::{voxels::chunk::ChunkPosition, PlayerAction};

pub mod camera;

/// Manages the camera and its controller.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
}

impl CameraState {
    /// Creates a camera at the configured start position, looking along +X.
    pub fn new(config: &EngineConfig) -> Self {
        let camera = Camera::new(Point3::from(config.start_position), Deg(0.0), Deg(0.0));
        let camera_controller = CameraController::new(config.camera_speed, config.mouse_sensitivity);

        CameraState {
            camera,
            camera_controller,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending input to the camera.
    ///
    /// # Arguments
    /// * `dt` - Time elapsed since the last update
    ///
    /// # Returns
    /// - `Some(CameraUpdates)` if the camera position or orientation changed
    /// - `None` if no updates were needed
    pub fn update(&mut self, dt: web_time::Duration) -> Option<CameraUpdates> {
        if !self.camera_controller.has_updates() {
            return None;
        }

        self.camera
            .get_controller_updates_and_reset_controller(&mut self.camera_controller, dt);

        let position = self.camera.position;
        Some(CameraUpdates {
            new_chunk_position: ChunkPosition::containing(position.x, position.z),
        })
    }

    /// Combined view-projection matrix for the current camera.
    pub fn view_proj(&self, projection: &Projection) -> Matrix4<f32> {
        projection.calc_matrix() * self.camera.calc_matrix()
    }
}

/// Represents updates to the camera's state that affect game world interaction.
///
/// This is returned by `CameraState::update()` when the camera's position or
/// orientation has changed.
pub struct CameraUpdates {
    /// The chunk the camera is now standing in
    pub new_chunk_position: ChunkPosition,
}
