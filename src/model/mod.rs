//! Model data: vertices with optional edge and face lists
//!
//! Models are plain aggregates built by the caller (or loaded from RON)
//! and read-only while rendering.

mod mesh;
mod io;

pub use mesh::*;
pub use io::*;
