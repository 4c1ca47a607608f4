//! Software rasterizer
//!
//! Features:
//! - Column-major 4x4 transforms with OpenGL-style projection
//! - Back-face culling against the camera position
//! - Flat Lambertian lighting with an ambient floor
//! - Painter's algorithm over line segments plus a per-pixel depth test
//! - Plain-text PGM export

mod math;
mod matrix;
mod canvas;
mod lighting;
mod types;
mod render;

pub use math::*;
pub use matrix::*;
pub use canvas::*;
pub use lighting::*;
pub use types::*;
pub use render::*;
