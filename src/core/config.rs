//! # Engine Configuration
//!
//! Runtime tunables, read once at startup from an optional `cubes.json` next to the
//! executable's working directory. Any field left out of the file keeps its default, and
//! a missing file means "all defaults". Chunk dimensions are not configurable; they are
//! compile-time constants in `engine_state::voxels::chunk`.
//!
//! ```json
//! { "render_distance": 4, "worker_threads": 8, "seed": null }
//! ```

use std::{fs, io::ErrorKind, path::Path};

use serde::Deserialize;

use super::EngineError;

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "cubes.json";

/// Startup configuration for the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Streaming radius R in chunks; the live set holds `(2R+1)²` slots.
    pub render_distance: u32,
    /// Size of the chunk generation worker pool.
    pub worker_threads: usize,
    /// World seed. `None` picks a random seed at startup.
    pub seed: Option<u32>,
    /// Reach of the edit ray in world units.
    pub max_ray_distance: f32,
    /// Darken block faces by the number of solid neighbours.
    pub occlusion_shading: bool,
    /// Fly speed in units per second.
    pub camera_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Angular speed of the sun in radians per second.
    pub day_speed: f32,
    pub start_position: [f32; 3],
    /// Directory holding `shaders/` and `textures/`.
    pub asset_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_distance: 8,
            worker_threads: 16,
            seed: Some(0),
            max_ray_distance: 10.0,
            occlusion_shading: false,
            camera_speed: 20.0,
            mouse_sensitivity: 0.4,
            field_of_view: 80.0,
            day_speed: 0.2,
            start_position: [8.0, 30.0, 8.0],
            asset_dir: String::from("assets"),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Returns
    /// An error if the text is not valid JSON or a value is out of range
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    /// Rejects values the engine cannot start with.
    fn validate(self) -> Result<Self, EngineError> {
        // populate waits on the worker pool, so an empty pool never finishes startup
        if self.worker_threads == 0 {
            return Err(EngineError::ConfigValue {
                field: "worker_threads",
                reason: "at least one chunk worker is required",
            });
        }
        Ok(self)
    }

    /// Loads the configuration at `path`, falling back to defaults when the file is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        match fs::read_to_string(path.as_ref()) {
            Ok(text) => Self::from_json(&text),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::info!(
                    "No config at {:?}, using defaults",
                    path.as_ref()
                );
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Number of chunk slots implied by the render distance.
    pub fn slot_count(&self) -> usize {
        let side = 2 * self.render_distance as usize + 1;
        side * side
    }

    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| fastrand::u32(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let config = EngineConfig::default();
        assert_eq!(config.render_distance, 8);
        assert_eq!(config.worker_threads, 16);
        assert_eq!(config.seed, Some(0));
        assert_eq!(config.slot_count(), 17 * 17);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "render_distance": 2, "seed": 42 }"#).unwrap();
        assert_eq!(config.render_distance, 2);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.worker_threads, 16);
        assert_eq!(config.slot_count(), 25);
    }

    #[test]
    fn test_null_seed_is_random() {
        let config = EngineConfig::from_json(r#"{ "seed": null }"#).unwrap();
        assert!(config.seed.is_none());
        let _ = config.resolve_seed();
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            EngineConfig::from_json("{ render_distance: }"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let result = EngineConfig::from_json(r#"{ "render_distance": 1, "worker_threads": 0 }"#);
        assert!(matches!(
            result,
            Err(EngineError::ConfigValue {
                field: "worker_threads",
                ..
            })
        ));
        assert!(EngineConfig::from_json(r#"{ "worker_threads": 1 }"#).is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = EngineConfig::load("definitely/not/here/cubes.json").unwrap();
        assert_eq!(config.max_ray_distance, 10.0);
    }
}
