//! # Core Module
//!
//! Shared primitives used throughout the engine: the thread-safe resource container that
//! backs every chunk slot, the engine configuration, and the fatal error taxonomy.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `EngineConfig`: Startup tunables loaded from `cubes.json`
//! - `EngineError`: Unrecoverable startup failures, reported through `fatal`
//!
//! ## Usage
//! ```rust
//! use cubes_engine::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod config;
pub mod error;
pub mod mt_resource;

pub use config::EngineConfig;
pub use error::{fatal, EngineError};
pub use mt_resource::MtResource;
