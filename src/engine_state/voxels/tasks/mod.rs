//! # Voxel Task System
//!
//! Work the streaming scheduler hands to the worker pool.

pub mod chunk_generation_task;
