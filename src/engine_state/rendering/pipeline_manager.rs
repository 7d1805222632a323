//! Manages the WebGPU render pipelines and executes frame plans.
//!
//! This module owns every pipeline the engine draws with and turns a [`FramePlan`] into
//! command buffers. It serves as the GPU half of the renderer: the plan decides what is
//! drawn, the pipeline manager decides how.
//!
//! # Architecture
//!
//! - `chunk`: instanced block faces, textured from the atlas, lit by the scene light and
//!   shadowed through the shadow map
//! - `shadow`: depth-only variant of the chunk pipeline rendered from the light
//! - `sprite`: camera-facing sun and moon billboards
//! - `wire`: line-list boxes for chunk borders and the look-at highlight
//! - `ui`: flat screen-space HUD quads
//!
//! # Resource Management
//!
//! Shaders are read from `<asset_dir>/shaders/` at startup. Compilation errors are caught
//! through a validation error scope and reported as `EngineError::ShaderCompile` rather than
//! surfacing later as a device panic.
//!
//! # Performance Considerations
//!
//! - A frame is two render passes: the shadow depth pass and the main pass
//! - Every chunk is one instanced draw of a 6-index quad; the origin comes from a dynamic
//!   uniform offset so no bind group is rebuilt per chunk

use std::path::Path;

use log::{debug, error};
use wgpu::{
    Device, Queue, RenderPipeline, ShaderModule, Surface, SurfaceConfiguration, TextureFormat,
};

use crate::{
    core::EngineError,
    engine_state::buffer_state::{
        BufferState, CHUNK_ORIGIN_STRIDE, CUBE_INDEX_BUFFER_NAME, CUBE_VERTEX_BUFFER_NAME,
        QUAD_INDEX_BUFFER_NAME, QUAD_VERTEX_BUFFER_NAME, SCENE_BUFFER_NAME,
        SPRITE_INSTANCE_BUFFER_NAME, UI_INSTANCE_BUFFER_NAME, WIRE_INSTANCE_BUFFER_NAME,
    },
};

use super::{
    bind_group_state::BindGroupState,
    frame::FramePlan,
    meshing::BlockFaceInstance,
    texture::Texture,
    vertex::{
        LineVertex, QuadVertex, SpriteInstance, UiQuadInstance, WireBoxInstance,
        CUBE_EDGE_INDICES, QUAD_INDICES,
    },
};

const CHUNK_SHADER: &str = "chunk.wgsl";
const SHADOW_SHADER: &str = "shadow.wgsl";
const SPRITE_SHADER: &str = "sprite.wgsl";
const WIRE_SHADER: &str = "wireframe.wgsl";
const UI_SHADER: &str = "ui.wgsl";

/// Atlas image, relative to the asset directory.
pub const ATLAS_PATH: &str = "textures/atlas.png";

/// Reads and compiles a WGSL shader.
///
/// # Arguments
/// * `device` - The WebGPU device
/// * `shader_dir` - Directory holding the shader sources
/// * `file_name` - File name of the shader, also used as its label
///
/// # Returns
/// `EngineError::ShaderLoad` if the file cannot be read, `EngineError::ShaderCompile` if
/// the device rejects the module
pub fn load_shader(
    device: &Device,
    shader_dir: &Path,
    file_name: &str,
) -> Result<ShaderModule, EngineError> {
    let path = shader_dir.join(file_name);
    let source = std::fs::read_to_string(&path).map_err(|source| EngineError::ShaderLoad {
        path: path.clone(),
        source,
    })?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(file_name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(EngineError::ShaderCompile {
            label: file_name.to_string(),
            message: err.to_string(),
        });
    }

    debug!("Compiled shader {:?}", path);
    Ok(module)
}

/// Everything needed to build one of the engine's pipelines.
struct PipelineDescription<'a> {
    label: &'a str,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    shader: &'a ShaderModule,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    /// `None` for depth-only pipelines
    color_format: Option<TextureFormat>,
    blend: wgpu::BlendState,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth_stencil: wgpu::DepthStencilState,
}

fn create_pipeline(device: &Device, description: PipelineDescription) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(description.label),
        bind_group_layouts: description.bind_group_layouts,
        push_constant_ranges: &[],
    });

    let targets = [description.color_format.map(|format| wgpu::ColorTargetState {
        format,
        blend: Some(description.blend),
        write_mask: wgpu::ColorWrites::ALL,
    })];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(description.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: description.shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: description.buffers,
        },
        fragment: description
            .color_format
            .map(|_| wgpu::FragmentState {
                module: description.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
        primitive: wgpu::PrimitiveState {
            topology: description.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: description.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(description.depth_stencil),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn depth_state(depth_write_enabled: bool, depth_compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: Texture::DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Owns the engine's pipelines and the textures they render into or sample.
pub struct PipelineManager {
    /// Manages all bind groups used in the pipeline
    pub bind_group_state: BindGroupState,
    /// Depth texture used for depth testing
    pub depth_texture: Texture,
    pub shadow_map: Texture,
    pub atlas: Texture,
    chunk_pipeline: RenderPipeline,
    shadow_pipeline: RenderPipeline,
    sprite_pipeline: RenderPipeline,
    wire_pipeline: RenderPipeline,
    ui_pipeline: RenderPipeline,
}

impl PipelineManager {
    /// Creates the textures, bind groups and pipelines.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue, used to upload the atlas
    /// * `config` - Surface configuration containing size and format
    /// * `buffer_state` - Owner of the buffers the bind groups reference
    /// * `asset_dir` - Directory holding `shaders/` and `textures/`
    ///
    /// # Returns
    /// An error if a shader or the atlas cannot be loaded
    pub fn new(
        device: &Device,
        queue: &Queue,
        config: &SurfaceConfiguration,
        buffer_state: &BufferState,
        asset_dir: &Path,
    ) -> Result<Self, EngineError> {
        let atlas = Texture::load_atlas(device, queue, &asset_dir.join(ATLAS_PATH))?;
        let shadow_map = Texture::create_shadow_map(device);
        let depth_texture = Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
        let bind_group_state = BindGroupState::new(device, buffer_state, &atlas, &shadow_map)?;

        let shader_dir = asset_dir.join("shaders");
        let chunk_shader = load_shader(device, &shader_dir, CHUNK_SHADER)?;
        let shadow_shader = load_shader(device, &shader_dir, SHADOW_SHADER)?;
        let sprite_shader = load_shader(device, &shader_dir, SPRITE_SHADER)?;
        let wire_shader = load_shader(device, &shader_dir, WIRE_SHADER)?;
        let ui_shader = load_shader(device, &shader_dir, UI_SHADER)?;

        let groups = &bind_group_state;
        let chunk_buffers = [QuadVertex::desc(), BlockFaceInstance::desc()];

        let chunk_pipeline = create_pipeline(
            device,
            PipelineDescription {
                label: "Chunk Render Pipeline",
                bind_group_layouts: &[
                    &groups.scene.layout,
                    &groups.chunk_origin.layout,
                    &groups.atlas.layout,
                    &groups.shadow_map.layout,
                ],
                shader: &chunk_shader,
                buffers: &chunk_buffers,
                color_format: Some(config.format),
                blend: wgpu::BlendState::REPLACE,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                depth_stencil: depth_state(true, wgpu::CompareFunction::Less),
            },
        );

        let shadow_pipeline = create_pipeline(
            device,
            PipelineDescription {
                label: "Shadow Render Pipeline",
                bind_group_layouts: &[&groups.scene.layout, &groups.chunk_origin.layout],
                shader: &shadow_shader,
                buffers: &chunk_buffers,
                color_format: None,
                blend: wgpu::BlendState::REPLACE,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                depth_stencil: wgpu::DepthStencilState {
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                    ..depth_state(true, wgpu::CompareFunction::LessEqual)
                },
            },
        );

        // Billboards sit behind the terrain and never occlude it.
        let sprite_pipeline = create_pipeline(
            device,
            PipelineDescription {
                label: "Sprite Render Pipeline",
                bind_group_layouts: &[&groups.scene.layout, &groups.atlas.layout],
                shader: &sprite_shader,
                buffers: &[QuadVertex::desc(), SpriteInstance::desc()],
                color_format: Some(config.format),
                blend: wgpu::BlendState::ALPHA_BLENDING,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                depth_stencil: depth_state(false, wgpu::CompareFunction::Always),
            },
        );

        let wire_pipeline = create_pipeline(
            device,
            PipelineDescription {
                label: "Wireframe Render Pipeline",
                bind_group_layouts: &[&groups.scene.layout],
                shader: &wire_shader,
                buffers: &[LineVertex::desc(), WireBoxInstance::desc()],
                color_format: Some(config.format),
                blend: wgpu::BlendState::REPLACE,
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                depth_stencil: depth_state(false, wgpu::CompareFunction::LessEqual),
            },
        );

        let ui_pipeline = create_pipeline(
            device,
            PipelineDescription {
                label: "UI Render Pipeline",
                bind_group_layouts: &[],
                shader: &ui_shader,
                buffers: &[QuadVertex::desc(), UiQuadInstance::desc()],
                color_format: Some(config.format),
                blend: wgpu::BlendState::ALPHA_BLENDING,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                depth_stencil: depth_state(false, wgpu::CompareFunction::Always),
            },
        );

        Ok(Self {
            bind_group_state,
            depth_texture,
            shadow_map,
            atlas,
            chunk_pipeline,
            shadow_pipeline,
            sprite_pipeline,
            wire_pipeline,
            ui_pipeline,
        })
    }

    /// Renders a frame plan to the given surface.
    ///
    /// # Arguments
    /// * `surface` - The target surface to render to
    /// * `device` - The WebGPU device for creating the command encoder
    /// * `queue` - The WebGPU queue for command submission
    /// * `buffer_state` - Buffers the plan's instances are written into
    /// * `plan` - What to draw
    ///
    /// # Returns
    /// The surface error if no frame could be acquired; nothing was drawn in that case
    pub fn execute(
        &mut self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        buffer_state: &mut BufferState,
        plan: &FramePlan,
    ) -> Result<(), wgpu::SurfaceError> {
        let billboards = plan.billboards();
        let wire_boxes = plan.wire_boxes();
        let ui_quads = plan.ui_quads();

        buffer_state.write_buffer(SCENE_BUFFER_NAME, 0, bytemuck::bytes_of(&plan.scene));
        buffer_state.write_instances(SPRITE_INSTANCE_BUFFER_NAME, &billboards);
        buffer_state.write_instances(WIRE_INSTANCE_BUFFER_NAME, &wire_boxes);
        buffer_state.write_instances(UI_INSTANCE_BUFFER_NAME, &ui_quads);

        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&Default::default());

        let (
            Some(quad_vertices),
            Some(quad_indices),
            Some(cube_vertices),
            Some(cube_indices),
            Some(sprite_instances),
            Some(wire_instances),
            Some(ui_instances),
        ) = (
            buffer_state.get_buffer(QUAD_VERTEX_BUFFER_NAME),
            buffer_state.get_buffer(QUAD_INDEX_BUFFER_NAME),
            buffer_state.get_buffer(CUBE_VERTEX_BUFFER_NAME),
            buffer_state.get_buffer(CUBE_INDEX_BUFFER_NAME),
            buffer_state.get_buffer(SPRITE_INSTANCE_BUFFER_NAME),
            buffer_state.get_buffer(WIRE_INSTANCE_BUFFER_NAME),
            buffer_state.get_buffer(UI_INSTANCE_BUFFER_NAME),
        )
        else {
            error!("Shared render buffers missing, skipping frame");
            frame.present();
            return Ok(());
        };

        let quad_index_count = QUAD_INDICES.len() as u32;
        let groups = &self.bind_group_state;

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, &groups.scene.group, &[]);
            shadow_pass.set_vertex_buffer(0, quad_vertices.slice(..));
            shadow_pass.set_index_buffer(quad_indices.slice(..), wgpu::IndexFormat::Uint16);

            for chunk in plan.chunk_draws() {
                let Some(faces) = buffer_state.chunk_buffer(chunk.slot) else {
                    continue;
                };
                let origin_offset = (chunk.slot as u64 * CHUNK_ORIGIN_STRIDE) as u32;
                shadow_pass.set_bind_group(1, &groups.chunk_origin.group, &[origin_offset]);
                shadow_pass.set_vertex_buffer(1, faces.slice(..));
                shadow_pass.draw_indexed(0..quad_index_count, 0, 0..chunk.face_count);
            }
        }

        {
            let [r, g, b] = plan.sky_color();
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !billboards.is_empty() {
                rpass.set_pipeline(&self.sprite_pipeline);
                rpass.set_bind_group(0, &groups.scene.group, &[]);
                rpass.set_bind_group(1, &groups.atlas.group, &[]);
                rpass.set_vertex_buffer(0, quad_vertices.slice(..));
                rpass.set_vertex_buffer(1, sprite_instances.slice(..));
                rpass.set_index_buffer(quad_indices.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..quad_index_count, 0, 0..billboards.len() as u32);
            }

            rpass.set_pipeline(&self.chunk_pipeline);
            rpass.set_bind_group(0, &groups.scene.group, &[]);
            rpass.set_bind_group(2, &groups.atlas.group, &[]);
            rpass.set_bind_group(3, &groups.shadow_map.group, &[]);
            rpass.set_vertex_buffer(0, quad_vertices.slice(..));
            rpass.set_index_buffer(quad_indices.slice(..), wgpu::IndexFormat::Uint16);
            for chunk in plan.chunk_draws() {
                let Some(faces) = buffer_state.chunk_buffer(chunk.slot) else {
                    continue;
                };
                let origin_offset = (chunk.slot as u64 * CHUNK_ORIGIN_STRIDE) as u32;
                rpass.set_bind_group(1, &groups.chunk_origin.group, &[origin_offset]);
                rpass.set_vertex_buffer(1, faces.slice(..));
                rpass.draw_indexed(0..quad_index_count, 0, 0..chunk.face_count);
            }

            if !wire_boxes.is_empty() {
                rpass.set_pipeline(&self.wire_pipeline);
                rpass.set_bind_group(0, &groups.scene.group, &[]);
                rpass.set_vertex_buffer(0, cube_vertices.slice(..));
                rpass.set_vertex_buffer(1, wire_instances.slice(..));
                rpass.set_index_buffer(cube_indices.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(
                    0..CUBE_EDGE_INDICES.len() as u32,
                    0,
                    0..wire_boxes.len() as u32,
                );
            }

            if !ui_quads.is_empty() {
                rpass.set_pipeline(&self.ui_pipeline);
                rpass.set_vertex_buffer(0, quad_vertices.slice(..));
                rpass.set_vertex_buffer(1, ui_instances.slice(..));
                rpass.set_index_buffer(quad_indices.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..quad_index_count, 0, 0..ui_quads.len() as u32);
            }
        }

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Handles window resize events by recreating the depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The new surface configuration containing the updated size
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
    }
}
