//! Vertex data structures and layouts.
//!
//! Every draw in the engine is instanced over a tiny shared mesh:
//!
//! - block faces, billboards and HUD quads expand a unit quad (`QuadVertex`)
//! - wireframe boxes expand a unit cube drawn as a line list (`LineVertex`)
//!
//! The per-draw data lives in instance buffers, laid out by the `*Instance` types below.
//! Chunk faces use `BlockFaceInstance` from the meshing module.

use bytemuck::{Pod, Zeroable};

/// A corner of the unit quad, in `[0, 1]²`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
}

impl QuadVertex {
    /// # Shader Attributes
    /// - `location = 0`: corner (vec2<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// A corner of the unit cube.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

pub const CUBE_VERTICES: [LineVertex; 8] = [
    LineVertex { position: [0.0, 0.0, 0.0] },
    LineVertex { position: [1.0, 0.0, 0.0] },
    LineVertex { position: [1.0, 0.0, 1.0] },
    LineVertex { position: [0.0, 0.0, 1.0] },
    LineVertex { position: [0.0, 1.0, 0.0] },
    LineVertex { position: [1.0, 1.0, 0.0] },
    LineVertex { position: [1.0, 1.0, 1.0] },
    LineVertex { position: [0.0, 1.0, 1.0] },
];

/// The twelve cube edges as a line list.
pub const CUBE_EDGE_INDICES: [u16; 24] = [
    0, 1, 1, 2, 2, 3, 3, 0, // bottom
    4, 5, 5, 6, 6, 7, 7, 4, // top
    0, 4, 1, 5, 2, 6, 3, 7, // uprights
];

/// A camera-facing textured square.
///
/// # Memory Layout
/// - Center: [f32; 3] (12 bytes)
/// - Scale: f32 (4 bytes)
/// - Tile: u32 (4 bytes)
///
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub center: [f32; 3],
    pub scale: f32,
    pub tile: u32,
}

impl SpriteInstance {
    /// # Shader Attributes
    /// - `location = 1`: center (vec3<f32>)
    /// - `location = 2`: scale (f32)
    /// - `location = 3`: tile (u32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Uint32,
                },
            ],
        }
    }
}

/// An axis-aligned wireframe box.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct WireBoxInstance {
    pub min: [f32; 3],
    pub size: [f32; 3],
    pub color: [f32; 3],
}

impl WireBoxInstance {
    /// # Shader Attributes
    /// - `location = 1`: min corner (vec3<f32>)
    /// - `location = 2`: size (vec3<f32>)
    /// - `location = 3`: color (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<WireBoxInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// A flat-coloured screen-space rectangle, in normalized device coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct UiQuadInstance {
    /// Lower-left corner
    pub min: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

impl UiQuadInstance {
    /// # Shader Attributes
    /// - `location = 1`: min corner (vec2<f32>)
    /// - `location = 2`: size (vec2<f32>)
    /// - `location = 3`: color (vec4<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<UiQuadInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
