//! Core types for the rasterizer

use serde::{Serialize, Deserialize};

use super::math::Vec3;
use super::matrix::Mat4;

/// Renderer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Ambient light floor added to every lit face (0.0-1.0)
    pub ambient: f32,
    /// Side length of the square stamped at every line step
    pub line_thickness: f32,
    /// Intensity of wireframe edges (edges are never lit)
    pub wire_intensity: f32,
    /// Triangles with any clip-space w below this are dropped
    pub near_w: f32,
    /// Drop faces whose normal points away from the camera
    pub backface_cull: bool,
    /// Move normals with the inverse-transpose of the model matrix
    /// instead of its upper 3x3 (matters under non-uniform scale)
    pub exact_normals: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            ambient: 0.3,
            line_thickness: 1.0,
            wire_intensity: 1.0,
            near_w: 0.1,
            backface_cull: true,
            exact_normals: true,
        }
    }
}

impl RenderSettings {
    /// Parse settings from RON. Missing fields keep their defaults.
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

/// Look-at camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::UP,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }
}

/// Model, view and projection matrices for one draw
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Transforms {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self { model, view, projection }
    }

    /// `view * model`
    pub fn model_view(&self) -> Mat4 {
        self.view * self.model
    }

    /// `projection * view * model`
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.model_view()
    }
}

/// Screen-space segment queued for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineToDraw {
    /// Screen x, y in pixels; z is depth in [0, 1]
    pub p1: Vec3,
    pub p2: Vec3,
    pub avg_z: f32,
    pub intensity: f32,
}

impl LineToDraw {
    pub fn new(p1: Vec3, p2: Vec3, intensity: f32) -> Self {
        Self {
            p1,
            p2,
            avg_z: (p1.z + p2.z) / 2.0,
            intensity,
        }
    }
}

/// Counters from one render call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub faces_total: usize,
    pub faces_culled: usize,
    pub faces_near_rejected: usize,
    pub faces_drawn: usize,
    pub edges_near_rejected: usize,
    pub edges_drawn: usize,
    /// Edges or faces skipped for out-of-range vertex indices
    pub skipped: usize,
    pub lines: usize,
}
