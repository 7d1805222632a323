//! Rendering system for the voxel engine.
//!
//! This module contains the core rendering functionality: face meshing, the per-frame draw
//! plan, day/night lighting, pipeline setup and the main render entry point. It provides a
//! high-level interface for rendering the streamed voxel world using WebGPU.
//!
//! World code never touches the GPU directly. Meshes reach it through the
//! [`InstanceUploader`] seam, which `BufferState` implements and tests replace with a
//! recorder.

use std::path::Path;

use log::{error, warn};
use pipeline_manager::PipelineManager;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::core::EngineError;

use super::{buffer_state::BufferState, camera_state::camera, voxels::chunk::ChunkPosition};

mod bind_group_state;
pub mod frame;
pub mod lighting;
pub mod meshing;
mod pipeline_manager;
mod texture;
pub mod ui;
pub mod vertex;

pub use frame::{FrameInputs, FramePlan, UploadedChunk};
pub use lighting::SceneLighting;
use meshing::BlockFaceInstance;

/// Receives remeshed chunks on the main thread.
///
/// `slot` identifies the world slot the faces belong to; a later upload for the same slot
/// replaces the earlier one.
pub trait InstanceUploader {
    fn upload_chunk(&mut self, slot: usize, origin: ChunkPosition, faces: &[BlockFaceInstance]);
}

/// Manages the entire rendering pipeline for the voxel engine.
///
/// This struct is the main entry point for all rendering operations.
/// It manages the WebGPU surface, device, queue, and rendering pipeline.
pub struct Renderer {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
    /// Manages the rendering pipelines and shaders
    pub pipeline_manager: PipelineManager,
    /// Per-slot chunk buffers and the shared per-frame buffers
    pub buffer_state: BufferState,
    /// Camera projection settings
    pub camera_projection: camera::Projection,
}

impl Renderer {
    /// Creates a new `Renderer` instance.
    ///
    /// # Arguments
    /// * `surface` - The WebGPU surface to render to, already configured
    /// * `surface_config` - Configuration for the surface
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue
    /// * `camera_projection` - Initial camera projection settings
    /// * `slot_count` - Number of world slots chunks are uploaded from
    /// * `asset_dir` - Directory holding shaders and textures
    ///
    /// # Returns
    /// An error if a shader or the atlas cannot be loaded
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        camera_projection: camera::Projection,
        slot_count: usize,
        asset_dir: &Path,
    ) -> Result<Self, EngineError> {
        let buffer_state = BufferState::new(device.clone(), queue.clone(), slot_count);
        let pipeline_manager =
            PipelineManager::new(&device, &queue, &surface_config, &buffer_state, asset_dir)?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            buffer_state,
            camera_projection,
        })
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration, camera projection, and depth buffer to match the
    /// new window size. Zero-sized windows (minimized) are ignored.
    ///
    /// # Arguments
    /// * `size` - The new window size in physical pixels
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);

        self.camera_projection.resize(size.width, size.height);
        self.pipeline_manager
            .resize(&self.device, &self.surface_config);
    }

    /// Window width over height.
    pub fn aspect(&self) -> f32 {
        self.surface_config.width.max(1) as f32 / self.surface_config.height.max(1) as f32
    }

    /// Renders one frame plan.
    ///
    /// A lost or outdated surface is reconfigured and the frame dropped; the next frame
    /// renders normally.
    pub fn render(&mut self, plan: &FramePlan) {
        let result = self.pipeline_manager.execute(
            &self.surface,
            &self.device,
            &self.queue,
            &mut self.buffer_state,
            plan,
        );

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
            }
            Err(wgpu::SurfaceError::Timeout) => warn!("Surface timeout, frame dropped"),
            Err(err) => error!("Error getting current frame: {:?}", err),
        }
    }
}
