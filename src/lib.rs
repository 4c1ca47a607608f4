//! Grayline: a small software 3D renderer with grayscale output
//!
//! Models (vertices plus edges and/or triangles) are pushed through
//! model/view/projection matrices, culled, lit by a single point light,
//! depth-sorted and drawn as lines onto a depth-tested intensity canvas,
//! which can be written out as a plain-text PGM or a PNG.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod model;
pub mod rasterizer;

pub use error::{CanvasError, ModelError, PrimitiveKind, RenderError};
pub use model::{load_model, load_model_from_str, save_model, Edge, Face, Model};
pub use rasterizer::{
    render, Camera, Canvas, LightSource, LineToDraw, Mat4, RenderSettings, RenderStats,
    Transforms, Vec3, Viewport,
};
