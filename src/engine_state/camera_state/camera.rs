//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - Camera representation and transformations
//! - Projection matrix handling
//! - Camera controller for fly-mode input processing
//!
//! ## Key Components
//! - `Camera`: The camera's position and orientation in 3D space
//! - `Projection`: Perspective projection settings
//! - `CameraController`: Accumulates input between frames and applies it to the camera

use cgmath::*;
use std::f32::consts::FRAC_PI_2;
use web_time::Duration;

use crate::engine_state::PlayerAction;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU uses a coordinate system where:
/// - X is right
/// - Y is up
/// - NDC (Normalized Device Coordinates) range from -1 to 1 in X and Y, and 0 to 1 in Z
///
/// This matrix performs two main transformations:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Near clipping plane. Billboards sit one unit from the eye, so this must stay below 1.
pub const Z_NEAR: f32 = 0.1;
/// Far clipping plane
pub const Z_FAR: f32 = 1000.0;

/// Represents a first-person camera in 3D space.
///
/// Yaw is measured from the +X axis towards +Z; pitch is positive looking up.
#[derive(Debug, Clone)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation in radians, clamped just short of straight up or down
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space. Can be any type that converts to `Point3<f32>`.
    /// * `yaw` - Initial yaw (horizontal rotation around Y axis). Can be any type that converts to `Rad<f32>`.
    /// * `pitch` - Initial pitch. Can be any type that converts to `Rad<f32>`.
    ///
    /// # Example
    /// ```rust
    /// use cgmath::{Deg, Point3};
    /// use cubes_engine::engine_state::camera_state::camera::Camera;
    ///
    /// let camera = Camera::new(Point3::new(8.0, 30.0, 8.0), Deg(0.0), Deg(0.0));
    /// assert!((camera.look_direction().x - 1.0).abs() < 1e-6);
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Unit vector the camera is facing.
    pub fn look_direction(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Calculates the view matrix for this camera.
    ///
    /// The view matrix transforms world coordinates to view (camera) space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.look_direction(), Vector3::unit_y())
    }

    /// Applies and clears the controller's accumulated input.
    ///
    /// # Arguments
    /// * `controller` - The camera controller containing input state
    /// * `dt` - Time elapsed since the last update
    ///
    /// # Notes
    /// - Horizontal movement follows yaw only, so looking down does not slow walking
    /// - Space and shift move straight up and down
    pub fn get_controller_updates_and_reset_controller(
        &mut self,
        controller: &mut CameraController,
        dt: Duration,
    ) {
        let dt = dt.as_secs_f32();

        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos);
        self.position += forward
            * (controller.amount_forward - controller.amount_backward)
            * controller.speed
            * dt;
        self.position +=
            right * (controller.amount_right - controller.amount_left) * controller.speed * dt;
        self.position.y += (controller.amount_up - controller.amount_down) * controller.speed * dt;

        // Mouse deltas are already in pixels for this frame, so they are not scaled by dt.
        self.yaw += Rad(controller.rotate_horizontal * controller.sensitivity);
        self.pitch += Rad(-controller.rotate_vertical * controller.sensitivity);
        self.clamp_pitch();

        controller.reset();
    }

    fn clamp_pitch(&mut self) {
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// This handles the perspective projection used to render the 3D scene.
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix.
    ///
    /// Combines the perspective projection with the OpenGL to WGPU coordinate system transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Handles camera movement and rotation based on user input.
///
/// Movement flags are latched per frame; mouse motion accumulates until the next update.
#[derive(Debug)]
pub struct CameraController {
    // Movement amounts (0 or 1)
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    amount_up: f32,
    amount_down: f32,

    // Accumulated mouse motion in pixels
    rotate_horizontal: f32,
    rotate_vertical: f32,

    /// Movement speed in units per second
    speed: f32,
    /// Radians of rotation per pixel of mouse motion, divided by 100
    sensitivity: f32,
}

impl CameraController {
    /// Creates a new camera controller with the given speed and sensitivity.
    ///
    /// # Arguments
    /// * `speed` - Base movement speed in units per second
    /// * `sensitivity` - Mouse look sensitivity multiplier
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            amount_up: 0.0,
            amount_down: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity: sensitivity / 100.0,
        }
    }

    /// Processes player actions and updates controller state accordingly.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        let flag = |held: bool| if held { 1.0 } else { 0.0 };
        self.amount_forward = flag(actions.move_forward);
        self.amount_backward = flag(actions.move_backward);
        self.amount_left = flag(actions.move_left);
        self.amount_right = flag(actions.move_right);
        self.amount_up = flag(actions.move_up);
        self.amount_down = flag(actions.move_down);

        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal += delta_x as f32;
            self.rotate_vertical += delta_y as f32;
        }
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        self.amount_forward > 0.0
            || self.amount_backward > 0.0
            || self.amount_left > 0.0
            || self.amount_right > 0.0
            || self.amount_up > 0.0
            || self.amount_down > 0.0
            || self.rotate_horizontal != 0.0
            || self.rotate_vertical != 0.0
    }

    fn reset(&mut self) {
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.amount_up = 0.0;
        self.amount_down = 0.0;
        self.amount_left = 0.0;
        self.amount_right = 0.0;
        self.amount_forward = 0.0;
        self.amount_backward = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_direction_follows_yaw_and_pitch() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(90.0), Deg(0.0));
        let direction = camera.look_direction();
        assert!(direction.x.abs() < 1e-5);
        assert!((direction.z - 1.0).abs() < 1e-5);

        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(-90.0));
        assert!(camera.look_direction().y < -0.99);
        assert!(camera.pitch > -Rad(FRAC_PI_2));
    }

    #[test]
    fn test_forward_moves_along_yaw() {
        let mut camera = Camera::new(Point3::new(0.0, 10.0, 0.0), Deg(0.0), Deg(45.0));
        let mut controller = CameraController::new(10.0, 0.4);
        controller.intake_actions(&PlayerAction {
            move_forward: true,
            ..Default::default()
        });
        assert!(controller.has_updates());

        camera.get_controller_updates_and_reset_controller(
            &mut controller,
            Duration::from_millis(500),
        );

        assert!((camera.position.x - 5.0).abs() < 1e-4);
        assert!((camera.position.y - 10.0).abs() < 1e-4);
        assert!(!controller.has_updates());
    }

    #[test]
    fn test_mouse_motion_accumulates() {
        let mut controller = CameraController::new(1.0, 100.0);
        let look = PlayerAction {
            rotate_view: Some((0.25, 0.0)),
            ..Default::default()
        };
        controller.intake_actions(&look);
        controller.intake_actions(&look);

        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.get_controller_updates_and_reset_controller(&mut controller, Duration::ZERO);
        assert!((camera.yaw.0 - 0.5).abs() < 1e-5);
    }
}
