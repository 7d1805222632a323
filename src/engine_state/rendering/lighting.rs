//! Day/night lighting model.
//!
//! The sun travels a circle in the xy plane at `day_speed` radians per second and the moon
//! sits opposite it. Whichever of the two is above the horizon lights the scene; the sky
//! colour fades with the sun's height. Everything here is plain math so a frame's lighting
//! can be computed and checked without a GPU.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};

use crate::engine_state::camera_state::camera::OPENGL_TO_WGPU_MATRIX;

/// Sky colour at noon.
pub const AMBIENT_SKY: [f32; 3] = [0.4, 0.4, 0.8];
pub const SUN_COLOR: [f32; 3] = [1.0, 0.9, 0.8];
pub const MOON_COLOR: [f32; 3] = [0.6, 0.6, 0.9];
/// Moonlight strength relative to sunlight.
pub const MOON_INTENSITY_SCALE: f32 = 0.3;
/// Lower bound on the ambient term, so night is dim rather than black.
pub const MIN_AMBIENT: f32 = 0.2;

/// Half extent of the shadow map's orthographic volume.
pub const SHADOW_HALF_EXTENT: f32 = 64.0;
pub const SHADOW_NEAR: f32 = 1.0;
pub const SHADOW_FAR: f32 = 500.0;
/// How far from the camera, along the light direction, the shadow camera sits.
pub const SHADOW_LIGHT_DISTANCE: f32 = 100.0;

/// Lighting for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    /// Unit vector from the origin towards the sun
    pub sun_direction: Vector3<f32>,
    /// Unit vector from the origin towards the moon
    pub moon_direction: Vector3<f32>,
    pub sky_color: [f32; 3],
    /// Whether the sun is the active light
    pub is_day: bool,
    pub light_color: [f32; 3],
    pub intensity: f32,
    pub ambient: f32,
}

impl SceneLighting {
    /// Computes the lighting at `time` seconds into the day cycle.
    ///
    /// # Arguments
    /// * `time` - Seconds since the engine started
    /// * `day_speed` - Angular speed of the sun in radians per second
    pub fn at(time: f32, day_speed: f32) -> Self {
        let angle = time * day_speed;
        let sun_direction = Vector3::new(angle.cos(), angle.sin(), 0.0);
        let moon_direction = -sun_direction;

        let sky_factor = (sun_direction.y + 1.0) / 2.0;
        let sky_color = AMBIENT_SKY.map(|channel| channel * sky_factor);

        let is_day = sun_direction.y >= 0.0;
        let (light_color, intensity) = if is_day {
            (SUN_COLOR, sun_direction.y.max(0.0))
        } else {
            (MOON_COLOR, (-sun_direction.y).max(0.0) * MOON_INTENSITY_SCALE)
        };

        Self {
            sun_direction,
            moon_direction,
            sky_color,
            is_day,
            light_color,
            intensity,
            ambient: intensity.max(MIN_AMBIENT),
        }
    }

    /// Unit vector towards the active light.
    pub fn light_direction(&self) -> Vector3<f32> {
        if self.is_day {
            self.sun_direction
        } else {
            self.moon_direction
        }
    }

    /// View-projection matrix of the shadow camera for a viewer at `camera_position`.
    ///
    /// The shadow camera looks at the viewer's xz position from `SHADOW_LIGHT_DISTANCE`
    /// units up the light direction, through an orthographic box.
    pub fn light_view_proj(&self, camera_position: Point3<f32>) -> Matrix4<f32> {
        let direction = self.light_direction();
        let target = Point3::new(camera_position.x, 0.0, camera_position.z);
        let eye = target + direction * SHADOW_LIGHT_DISTANCE;

        // Straight overhead the default up vector is parallel to the view direction.
        let up = if direction.y.abs() > 0.99 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };

        let view = Matrix4::look_at_rh(eye, target, up);
        let projection = cgmath::ortho(
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            SHADOW_NEAR,
            SHADOW_FAR,
        );
        OPENGL_TO_WGPU_MATRIX * projection * view
    }

    /// Where the sun and moon billboards are drawn for a viewer at `camera_position`.
    pub fn billboard_positions(&self, camera_position: Point3<f32>) -> (Point3<f32>, Point3<f32>) {
        let eye = camera_position.to_vec();
        (
            Point3::from_vec(eye + self.sun_direction.normalize()),
            Point3::from_vec(eye + self.moon_direction.normalize()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};
    use std::f32::consts::PI;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_noon() {
        let lighting = SceneLighting::at(PI / 2.0, 1.0);
        assert!(lighting.is_day);
        assert!(close(lighting.sun_direction.y, 1.0));
        assert!(close(lighting.moon_direction.y, -1.0));
        assert!(close(lighting.intensity, 1.0));
        assert!(close(lighting.sky_color[2], 0.8));
        assert_eq!(lighting.light_color, SUN_COLOR);
    }

    #[test]
    fn test_midnight() {
        let lighting = SceneLighting::at(3.0 * PI / 2.0, 1.0);
        assert!(!lighting.is_day);
        assert!(close(lighting.intensity, MOON_INTENSITY_SCALE));
        assert!(close(lighting.ambient, MOON_INTENSITY_SCALE));
        assert!(close(lighting.sky_color[0], 0.0));
        assert_eq!(lighting.light_color, MOON_COLOR);
    }

    #[test]
    fn test_sunrise_keeps_ambient_floor() {
        let lighting = SceneLighting::at(0.0, 0.2);
        assert!(close(lighting.sun_direction.x, 1.0));
        assert!(close(lighting.intensity, 0.0));
        assert!(close(lighting.ambient, MIN_AMBIENT));
        assert!(close(lighting.sky_color[2], 0.4));
    }

    #[test]
    fn test_shadow_camera_sees_viewer() {
        let lighting = SceneLighting::at(PI / 2.0, 1.0);
        let camera = Point3::new(30.0, 20.0, -12.0);
        let clip = lighting.light_view_proj(camera) * Vector4::new(30.0, 0.0, -12.0, 1.0);
        let ndc = Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);

        assert!(close(ndc.x, 0.0) && close(ndc.y, 0.0));
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert!(lighting.light_view_proj(camera).invert().is_some());
    }
}
