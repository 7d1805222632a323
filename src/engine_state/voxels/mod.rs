//! # Voxel Engine Core
//!
//! This module contains the voxel world itself: the blocks, the chunks they are grouped
//! into, the fixed set of slots holding the live chunks, and the machinery that keeps those
//! slots filled around the viewpoint.
//!
//! ## Architecture
//!
//! * **Block**: block types, faces and per-type texture lookup
//! * **Chunk**: a fixed-size column of blocks, its terrain generation and occlusion brightness
//! * **World**: the slot arena, position lookup and raycasting
//! * **Streaming**: reassigns slots as the viewpoint moves and uploads finished chunks
//! * **Edit**: destroy and place along the camera ray
//! * **Tasks**: the generation work run on the worker pool
//!
//! ## Data Flow
//!
//! 1. Streaming assigns a slot to a chunk position and queues a generation task
//! 2. A worker fills the slot's blocks and builds its face mesh
//! 3. The main thread uploads the mesh on its round-robin pass
//! 4. Edits write blocks in place and remesh and upload on the main thread
//!
//! ## Thread Safety
//!
//! * Chunk content is behind one `RwLock` per slot; workers write, the main thread tries
//! * Slot assignment and upload order are main-thread only
//! * Tickets make a worker skip a task whose slot has since been reassigned

pub mod block;
pub mod chunk;
pub mod edit;
pub mod streaming;
pub mod tasks;
pub mod world;
