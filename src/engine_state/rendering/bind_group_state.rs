//! Manages WebGPU bind groups and their layouts.
//!
//! This module handles the creation of the bind groups every pipeline shares. It provides
//! a centralized place for the GPU resources shaders read: the scene uniform, the per-slot
//! chunk origins, the block atlas and the shadow map.
//!
//! # Group Usage
//!
//! | Layout        | Chunk | Shadow | Sprite | Wire | UI |
//! |---------------|-------|--------|--------|------|----|
//! | scene         | 0     | 0      | 0      | 0    |    |
//! | chunk origin  | 1     | 1      |        |      |    |
//! | atlas         | 2     |        | 1      |      |    |
//! | shadow map    | 3     |        |        |      |    |

use std::num::NonZeroU64;

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device};

use crate::{
    core::EngineError,
    engine_state::buffer_state::{
        BufferState, ChunkOriginUniform, CHUNK_ORIGIN_BUFFER_NAME, SCENE_BUFFER_NAME,
    },
};

use super::texture::Texture;

/// A bind group together with the layout it was created from.
pub struct BoundResource {
    pub layout: BindGroupLayout,
    pub group: BindGroup,
}

/// The bind groups shared by the engine's pipelines.
pub struct BindGroupState {
    pub scene: BoundResource,
    /// Bound with a dynamic offset of `slot × CHUNK_ORIGIN_STRIDE`
    pub chunk_origin: BoundResource,
    pub atlas: BoundResource,
    pub shadow_map: BoundResource,
}

impl BindGroupState {
    /// Creates every shared bind group.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Owner of the scene and chunk origin buffers
    /// * `atlas` - The block texture atlas
    /// * `shadow_map` - Depth target of the shadow pass
    ///
    /// # Returns
    /// `EngineError::MissingBuffer` if a buffer the groups bind has not been created
    pub fn new(
        device: &Device,
        buffer_state: &BufferState,
        atlas: &Texture,
        shadow_map: &Texture,
    ) -> Result<Self, EngineError> {
        let scene_buffer = buffer_state
            .get_buffer(SCENE_BUFFER_NAME)
            .ok_or(EngineError::MissingBuffer(SCENE_BUFFER_NAME))?;
        let chunk_origin_buffer = buffer_state
            .get_buffer(CHUNK_ORIGIN_BUFFER_NAME)
            .ok_or(EngineError::MissingBuffer(CHUNK_ORIGIN_BUFFER_NAME))?;

        Ok(Self {
            scene: Self::generate_scene_bindgroups(device, scene_buffer),
            chunk_origin: Self::generate_chunk_origin_bindgroups(device, chunk_origin_buffer),
            atlas: Self::generate_atlas_bindgroups(device, atlas),
            shadow_map: Self::generate_shadow_map_bindgroups(device, shadow_map),
        })
    }

    fn generate_scene_bindgroups(device: &Device, buffer: &Buffer) -> BoundResource {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some(SCENE_BIND_GROUP_LAYOUT),
        });

        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(SCENE_BIND_GROUP),
        });

        BoundResource { layout, group }
    }

    /// Each draw sees one 16-byte window of the origin buffer, selected by dynamic offset.
    fn generate_chunk_origin_bindgroups(device: &Device, buffer: &Buffer) -> BoundResource {
        let window = NonZeroU64::new(std::mem::size_of::<ChunkOriginUniform>() as u64);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: window,
                },
                count: None,
            }],
            label: Some(CHUNK_ORIGIN_BIND_GROUP_LAYOUT),
        });

        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: window,
                }),
            }],
            label: Some(CHUNK_ORIGIN_BIND_GROUP),
        });

        BoundResource { layout, group }
    }

    fn generate_atlas_bindgroups(device: &Device, atlas: &Texture) -> BoundResource {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    // This should match the filterable field of the corresponding Texture entry above.
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some(ATLAS_BIND_GROUP_LAYOUT),
        });

        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
            label: Some(ATLAS_BIND_GROUP),
        });

        BoundResource { layout, group }
    }

    fn generate_shadow_map_bindgroups(device: &Device, shadow_map: &Texture) -> BoundResource {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Depth,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
            label: Some(SHADOW_MAP_BIND_GROUP_LAYOUT),
        });

        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
            label: Some(SHADOW_MAP_BIND_GROUP),
        });

        BoundResource { layout, group }
    }
}

/// Name of the scene bind group
pub const SCENE_BIND_GROUP: &str = "scene_bind_group";
/// Name of the scene bind group layout
pub const SCENE_BIND_GROUP_LAYOUT: &str = "scene_bind_group_layout";
/// Name of the chunk origin bind group
pub const CHUNK_ORIGIN_BIND_GROUP: &str = "chunk_origin_bind_group";
/// Name of the chunk origin bind group layout
pub const CHUNK_ORIGIN_BIND_GROUP_LAYOUT: &str = "chunk_origin_bind_group_layout";
/// Name of the atlas bind group
pub const ATLAS_BIND_GROUP: &str = "atlas_bind_group";
/// Name of the atlas bind group layout
pub const ATLAS_BIND_GROUP_LAYOUT: &str = "atlas_bind_group_layout";
/// Name of the shadow map bind group
pub const SHADOW_MAP_BIND_GROUP: &str = "shadow_map_bind_group";
/// Name of the shadow map bind group layout
pub const SHADOW_MAP_BIND_GROUP_LAYOUT: &str = "shadow_map_bind_group_layout";
