//! # Engine Errors
//!
//! Every failure in this module is unrecoverable startup misconfiguration: a missing shader,
//! an unreadable texture, a world that could not be allocated, a GPU that refuses to hand
//! out a device. Startup code returns `Result<_, EngineError>` and the application shell
//! hands any error to [`fatal`], which logs the diagnostic and terminates the process.
//!
//! Expected misses (a ray that hits nothing, a position outside the streamed window, a
//! full task queue) are never errors; they are `Option`/`Result` values that callers skip.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("could not read shader {path:?}: {source}")]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader {label} failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
    #[error("could not load texture {path:?}: {source}")]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("GPU buffer '{0}' was never created")]
    MissingBuffer(&'static str),
    #[error("could not allocate {slots} chunk slots for the world store")]
    WorldAllocation { slots: usize },
    #[error("could not spawn chunk worker thread: {source}")]
    WorkerSpawn {
        #[source]
        source: std::io::Error,
    },
    #[error("IO error reading config: {0}")]
    Config(#[from] std::io::Error),
    #[error("JSON parse error in config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    ConfigValue {
        field: &'static str,
        reason: &'static str,
    },
    #[error("no suitable GPU adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),
    #[error("GPU device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("could not create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    #[error("surface is not supported by the selected adapter")]
    SurfaceUnsupported,
    #[error("could not create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),
    #[error("event loop failure: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Logs the error and terminates the process with a non-zero exit status.
pub fn fatal(error: EngineError) -> ! {
    log::error!("fatal: {error}");
    std::process::exit(1);
}
