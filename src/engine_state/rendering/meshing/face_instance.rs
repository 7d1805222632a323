//! Per-face instance record consumed by the chunk shader.

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Shade byte written when a block carries no brightness.
pub const UNSHADED: u8 = u8::MAX;

/// One visible block face.
///
/// # Memory Layout
/// - Position: u16 packed local block index (2 bytes)
/// - Texture ID: u16 atlas tile (2 bytes)
/// - Face: u8 `BlockSide` discriminant (1 byte)
/// - Shade: u8 brightness scaled to 0-255 (1 byte)
/// - Padding (2 bytes)
///
/// Total size: 8 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockFaceInstance {
    pub position: u16,
    pub texture_id: u16,
    pub face: u8,
    pub shade: u8,
    _padding: [u8; 2],
}

impl BlockFaceInstance {
    /// Creates a face record.
    ///
    /// # Arguments
    /// * `position` - Local block index inside the chunk
    /// * `side` - Which face of the block is visible
    /// * `texture_id` - Atlas tile for this face
    /// * `brightness` - Optional flat shading factor in `[0, 1]`
    pub fn new(position: usize, side: BlockSide, texture_id: u16, brightness: Option<f32>) -> Self {
        let shade = brightness
            .map(|b| (b.clamp(0.0, 1.0) * UNSHADED as f32).round() as u8)
            .unwrap_or(UNSHADED);
        Self {
            position: position as u16,
            texture_id,
            face: side as u8,
            shade,
            _padding: [0; 2],
        }
    }

    /// The face direction, decoded from the stored byte.
    pub fn side(&self) -> Option<BlockSide> {
        BlockSide::from_raw(self.face)
    }

    /// Instance buffer layout.
    ///
    /// # Shader Attributes
    /// - `location = 1`: position, texture_id (vec2<u32>)
    /// - `location = 2`: face, shade (vec4<u32>, last two lanes unused)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlockFaceInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Uint16x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[u16; 2]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Uint8x4,
                },
            ],
        }
    }
}
