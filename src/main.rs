//! # Cubes Engine Entry Point
//!
//! Calls into the library's `run()` to start the engine.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! ```

fn main() {
    cubes_engine::run();
}
