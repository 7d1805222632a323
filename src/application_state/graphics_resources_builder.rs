//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources required by the application:
//! the window, the WebGPU surface, and the device and queue.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Helper for graphics initialization, delivered as a user event
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::sync::Arc;

use log::info;
use wgpu::{Device, Features, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::core::{fatal, EngineError};

const WINDOW_TITLE: &str = "Cubes";

/// Contains all graphics-related resources required by the application.
///
/// Created once during startup and handed whole to `EngineState::new`.
pub struct Graphics {
    pub window: Arc<Window>,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
}

/// Creates the window and initializes the GPU context for it.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
///
/// # Returns
/// The initialized `Graphics`, with the surface already configured to the window size
async fn create_graphics(event_loop: &ActiveEventLoop) -> Result<Graphics, EngineError> {
    let window_attrs = Window::default_attributes().with_title(WINDOW_TITLE);
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    // Backends::PRIMARY => Vulkan + Metal + DX12
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await?;
    info!("Using adapter {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            required_features: Features::empty(),
            required_limits: wgpu::Limits::default(),
            label: None,
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        })
        .await?;

    let size = window.inner_size();

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or(surface_caps.formats.first())
        .copied()
        .ok_or(EngineError::SurfaceUnsupported)?;
    let present_mode = surface_caps
        .present_modes
        .first()
        .copied()
        .ok_or(EngineError::SurfaceUnsupported)?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .ok_or(EngineError::SurfaceUnsupported)?;

    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    Ok(Graphics {
        window,
        surface,
        surface_config,
        device,
        queue,
    })
}

/// Helper struct for initializing graphics resources once the event loop is running.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Waiting for the first `resumed` event
    Builder(GraphicsBuilder),

    /// State after graphics resources have been moved into the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the main thread
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Creates the graphics resources and sends them back as a user event.
    ///
    /// Does nothing after the first call. Any initialization failure is fatal.
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop used to create the graphics context
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let gfx = pollster::block_on(create_graphics(event_loop)).unwrap_or_else(|err| fatal(err));
        if event_loop_proxy.send_event(gfx).is_err() {
            log::error!("Event loop closed before graphics were delivered");
            event_loop.exit();
        }
    }
}
