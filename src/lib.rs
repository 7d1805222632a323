#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Cubes Engine
//!
//! A streaming voxel world rendered with Rust and WGPU.
//!
//! The camera flies over an endless, seed-determined terrain. Chunks around it are
//! generated and meshed on a worker pool, uploaded to the GPU one per frame, and drawn with
//! a day/night cycle and shadow mapping. Blocks can be removed and placed along the view ray.
//!
//! ## Key Modules
//!
//! * `core` - Configuration, errors and the shared-resource container
//! * `engine_state` - World, streaming, task scheduling, camera and rendering
//! * `application_state` - Window, event loop and input handling
//!
//! ## Architecture
//!
//! * The main thread owns the window, the GPU and every slot assignment
//! * Worker threads only generate and mesh chunks they are handed through the work queue
//! * Meshes reach the GPU through the `InstanceUploader` seam, so the world can be driven
//!   headless in tests
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     cubes_engine::run();
//! }
//! ```

use application_state::{
    graphics_resources_builder::{GraphicsBuilder, MaybeGraphics},
    ApplicationState,
};
use log::info;
use winit::event_loop::EventLoop;

use crate::core::{config::CONFIG_FILE_NAME, fatal, EngineConfig, EngineError};

mod application_state;
pub mod core;
pub mod engine_state;

/// Initializes logging, loads `cubes.json` and runs the event loop until the window closes.
///
/// Any startup failure is logged and terminates the process.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig::load(CONFIG_FILE_NAME).unwrap_or_else(|err| fatal(err));

    let event_loop = EventLoop::with_user_event()
        .build()
        .unwrap_or_else(|err| fatal(err.into()));

    let mut state = ApplicationState::new(
        MaybeGraphics::Builder(GraphicsBuilder::new(event_loop.create_proxy())),
        config,
    );

    if let Err(err) = event_loop.run_app(&mut state) {
        fatal(EngineError::from(err));
    }
}
