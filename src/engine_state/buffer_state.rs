//! # Buffer State Module
//!
//! This module provides a centralized system for managing GPU buffers in the voxel engine.
//! It handles buffer creation, writing and usage analytics, and owns the per-slot chunk
//! instance buffers the streaming scheduler and the edit path upload into.
//!
//! ## Architecture
//!
//! Shared buffers (the scene uniform, the unit quad and cube, the per-frame instance lists)
//! are registered by name. Chunk faces get one vertex buffer per world slot, created on the
//! first upload and grown by doubling when a remesh produces more faces than fit; a
//! slot's buffer is reused for every chunk the slot ever holds.
//!
//! Chunk origins live in one uniform buffer with a fixed-stride entry per slot, bound with a
//! dynamic offset when the chunk is drawn.
//!
//! ## Performance Considerations
//!
//! * Chunk buffers grow geometrically and never shrink, so steady-state uploads are plain
//!   queue writes
//! * Per-frame instance buffers are rewritten in place unless the frame needs more room

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use log::{debug, error};
use wgpu::{util::DeviceExt, Buffer, Device, Queue};

use crate::engine_state::{
    rendering::{
        frame::{SceneUniform, UploadedChunk},
        meshing::{BlockFaceInstance, MAX_FACES_PER_CHUNK},
        vertex::{CUBE_EDGE_INDICES, CUBE_VERTICES, QUAD_INDICES, QUAD_VERTICES},
        InstanceUploader,
    },
    voxels::chunk::ChunkPosition,
};

pub const SCENE_BUFFER_NAME: &str = "scene_buffer";
pub const CHUNK_ORIGIN_BUFFER_NAME: &str = "chunk_origin_buffer";
pub const QUAD_VERTEX_BUFFER_NAME: &str = "quad_vertex_buffer";
pub const QUAD_INDEX_BUFFER_NAME: &str = "quad_index_buffer";
pub const CUBE_VERTEX_BUFFER_NAME: &str = "cube_vertex_buffer";
pub const CUBE_INDEX_BUFFER_NAME: &str = "cube_index_buffer";
pub const SPRITE_INSTANCE_BUFFER_NAME: &str = "sprite_instance_buffer";
pub const WIRE_INSTANCE_BUFFER_NAME: &str = "wire_instance_buffer";
pub const UI_INSTANCE_BUFFER_NAME: &str = "ui_instance_buffer";

/// Byte distance between two slots' entries in the chunk origin buffer. Dynamic uniform
/// offsets must be multiples of the device's alignment, which is at most 256.
pub const CHUNK_ORIGIN_STRIDE: wgpu::BufferAddress = 256;

/// Initial room in a slot's instance buffer, in faces.
const INITIAL_CHUNK_FACES: usize = 1024;
/// Initial room in each per-frame instance buffer, in bytes.
const INITIAL_INSTANCE_BYTES: u64 = 4096;

/// World-space origin of the chunk a draw belongs to.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ChunkOriginUniform {
    pub origin: [f32; 4],
}

/// Analytics data for a GPU buffer
///
/// Tracks memory allocation, usage, and write operations for a buffer
/// to help identify optimization opportunities.
#[derive(Debug, Default)]
struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    allocated_memory: u64,
    /// Actual memory used in the buffer in bytes (based on writes)
    used_memory: u64,
    /// Number of times the buffer has been written to
    times_written: u64,
}

/// A slot's face buffer and what it currently holds.
struct ChunkInstanceBuffer {
    buffer: Buffer,
    capacity_faces: usize,
    uploaded: UploadedChunk,
}

/// Central manager for GPU buffers in the voxel engine
pub struct BufferState {
    device: Device,
    queue: Queue,
    /// Map of buffer names to buffer objects
    buffers: HashMap<&'static str, Buffer>,
    /// Analytics data for each named buffer
    buffer_analytics: HashMap<&'static str, BufferAnalytics>,
    /// One entry per world slot; `None` until the slot's first upload
    chunk_buffers: Vec<Option<ChunkInstanceBuffer>>,
}

impl BufferState {
    /// Creates the shared buffers for a world of `slot_count` slots.
    ///
    /// # Arguments
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    /// * `slot_count` - Number of world slots that may upload chunks
    pub fn new(device: Device, queue: Queue, slot_count: usize) -> Self {
        let mut state = Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
            chunk_buffers: (0..slot_count).map(|_| None).collect(),
        };

        state.create_buffer(
            SCENE_BUFFER_NAME,
            &wgpu::BufferDescriptor {
                label: Some(SCENE_BUFFER_NAME),
                size: std::mem::size_of::<SceneUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        );
        state.create_buffer(
            CHUNK_ORIGIN_BUFFER_NAME,
            &wgpu::BufferDescriptor {
                label: Some(CHUNK_ORIGIN_BUFFER_NAME),
                size: CHUNK_ORIGIN_STRIDE * slot_count.max(1) as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        );

        state.create_buffer_init(
            QUAD_VERTEX_BUFFER_NAME,
            bytemuck::cast_slice(&QUAD_VERTICES),
            wgpu::BufferUsages::VERTEX,
        );
        state.create_buffer_init(
            QUAD_INDEX_BUFFER_NAME,
            bytemuck::cast_slice(&QUAD_INDICES),
            wgpu::BufferUsages::INDEX,
        );
        state.create_buffer_init(
            CUBE_VERTEX_BUFFER_NAME,
            bytemuck::cast_slice(&CUBE_VERTICES),
            wgpu::BufferUsages::VERTEX,
        );
        state.create_buffer_init(
            CUBE_INDEX_BUFFER_NAME,
            bytemuck::cast_slice(&CUBE_EDGE_INDICES),
            wgpu::BufferUsages::INDEX,
        );

        for name in [
            SPRITE_INSTANCE_BUFFER_NAME,
            WIRE_INSTANCE_BUFFER_NAME,
            UI_INSTANCE_BUFFER_NAME,
        ] {
            state.create_buffer(
                name,
                &wgpu::BufferDescriptor {
                    label: Some(name),
                    size: INITIAL_INSTANCE_BYTES,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                },
            );
        }

        state
    }

    /// Creates an empty buffer with the specified descriptor, replacing any buffer of the
    /// same name.
    pub fn create_buffer(
        &mut self,
        buffer_name: &'static str,
        buffer_descriptor: &wgpu::BufferDescriptor,
    ) {
        let buffer = self.device.create_buffer(buffer_descriptor);
        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics.insert(
            buffer_name,
            BufferAnalytics {
                allocated_memory: buffer_descriptor.size,
                ..Default::default()
            },
        );
    }

    /// Creates a buffer and initializes it with data
    pub fn create_buffer_init(
        &mut self,
        buffer_name: &'static str,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(buffer_name),
                contents,
                usage,
            });

        self.buffers.insert(buffer_name, buffer);
        self.buffer_analytics.insert(
            buffer_name,
            BufferAnalytics {
                allocated_memory: contents.len() as u64,
                used_memory: contents.len() as u64,
                times_written: 1,
            },
        );
    }

    /// Writes raw byte data to a named buffer
    ///
    /// # Returns
    /// `false`, with an error logged, if the buffer does not exist or the write would run
    /// past its end
    pub fn write_buffer(
        &mut self,
        buffer_name: &'static str,
        offset: wgpu::BufferAddress,
        data: &[u8],
    ) -> bool {
        let (Some(buffer), Some(analytics)) = (
            self.buffers.get(buffer_name),
            self.buffer_analytics.get_mut(buffer_name),
        ) else {
            error!("Write to unknown buffer '{}'", buffer_name);
            return false;
        };

        let data_size = data.len() as u64;
        if offset + data_size > analytics.allocated_memory {
            error!(
                "Buffer write out of bounds for buffer name '{}' ({} + {} > {})",
                buffer_name, offset, data_size, analytics.allocated_memory
            );
            return false;
        }

        self.queue.write_buffer(buffer, offset, data);
        analytics.used_memory = analytics.used_memory.max(offset + data_size);
        analytics.times_written += 1;
        true
    }

    /// Replaces the contents of a per-frame vertex buffer, growing it if needed.
    pub fn write_instances<T: Pod>(&mut self, buffer_name: &'static str, instances: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(instances);
        let allocated = self
            .buffer_analytics
            .get(buffer_name)
            .map_or(0, |analytics| analytics.allocated_memory);

        if bytes.len() as u64 > allocated {
            let size = (bytes.len() as u64).next_power_of_two();
            debug!("Growing '{}' to {} bytes", buffer_name, size);
            self.create_buffer(
                buffer_name,
                &wgpu::BufferDescriptor {
                    label: Some(buffer_name),
                    size,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                },
            );
        }

        if !bytes.is_empty() {
            self.write_buffer(buffer_name, 0, bytes);
        }
    }

    /// Gets a reference to a buffer by name
    pub fn get_buffer(&self, buffer_name: &'static str) -> Option<&Buffer> {
        self.buffers.get(buffer_name)
    }

    /// The face buffer of a slot, once it has been uploaded.
    pub fn chunk_buffer(&self, slot: usize) -> Option<&Buffer> {
        self.chunk_buffers
            .get(slot)?
            .as_ref()
            .map(|chunk_buffer| &chunk_buffer.buffer)
    }

    /// Every chunk currently resident on the GPU.
    pub fn uploaded_chunks(&self) -> Vec<UploadedChunk> {
        self.chunk_buffers
            .iter()
            .flatten()
            .map(|chunk_buffer| chunk_buffer.uploaded)
            .collect()
    }

    /// Gets the total allocated memory across all buffers
    pub fn get_total_allocated_memory(&self) -> u64 {
        let chunk_memory: u64 = self
            .chunk_buffers
            .iter()
            .flatten()
            .map(|chunk_buffer| chunk_buffer.buffer.size())
            .sum();
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.allocated_memory)
            .sum::<u64>()
            + chunk_memory
    }

    /// Gets the total used memory across all buffers
    pub fn get_total_used_memory(&self) -> u64 {
        let chunk_memory: u64 = self
            .chunk_buffers
            .iter()
            .flatten()
            .map(|chunk_buffer| {
                chunk_buffer.uploaded.face_count as u64
                    * std::mem::size_of::<BlockFaceInstance>() as u64
            })
            .sum();
        self.buffer_analytics
            .values()
            .map(|analytics| analytics.used_memory)
            .sum::<u64>()
            + chunk_memory
    }

    fn create_chunk_buffer(&self, slot: usize, capacity_faces: usize) -> Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("chunk_instance_buffer_{slot}")),
            size: (capacity_faces * std::mem::size_of::<BlockFaceInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

impl InstanceUploader for BufferState {
    fn upload_chunk(&mut self, slot: usize, origin: ChunkPosition, faces: &[BlockFaceInstance]) {
        if slot >= self.chunk_buffers.len() {
            error!("Upload for slot {} outside the {} known slots", slot, self.chunk_buffers.len());
            return;
        }

        let needed = faces.len().max(1);
        let current = self.chunk_buffers[slot]
            .as_ref()
            .map_or(0, |chunk_buffer| chunk_buffer.capacity_faces);

        if needed > current {
            let capacity_faces = needed
                .next_power_of_two()
                .max(INITIAL_CHUNK_FACES)
                .min(MAX_FACES_PER_CHUNK);
            debug!("Slot {} face buffer sized for {} faces", slot, capacity_faces);
            let buffer = self.create_chunk_buffer(slot, capacity_faces);
            self.chunk_buffers[slot] = Some(ChunkInstanceBuffer {
                buffer,
                capacity_faces,
                uploaded: UploadedChunk {
                    slot,
                    origin,
                    face_count: 0,
                },
            });
        }

        let Some(chunk_buffer) = self.chunk_buffers[slot].as_mut() else {
            return;
        };
        if !faces.is_empty() {
            self.queue
                .write_buffer(&chunk_buffer.buffer, 0, bytemuck::cast_slice(faces));
        }
        chunk_buffer.uploaded = UploadedChunk {
            slot,
            origin,
            face_count: faces.len() as u32,
        };

        let origin_uniform = ChunkOriginUniform {
            origin: [origin.x as f32, 0.0, origin.z as f32, 0.0],
        };
        self.write_buffer(
            CHUNK_ORIGIN_BUFFER_NAME,
            slot as u64 * CHUNK_ORIGIN_STRIDE,
            bytemuck::bytes_of(&origin_uniform),
        );
    }
}
