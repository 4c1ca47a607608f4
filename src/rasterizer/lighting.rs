//! Single point light, Lambertian diffuse

use serde::{Serialize, Deserialize};

use super::math::Vec3;

/// Point light in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub position: Vec3,
    pub intensity: f32,
}

impl LightSource {
    pub fn new(position: Vec3, intensity: f32) -> Self {
        Self { position, intensity }
    }
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            intensity: 1.0,
        }
    }
}

/// `max(0, N . L)`. Both vectors must already be unit length.
pub fn diffuse_intensity(normal: Vec3, light_dir_from_surface: Vec3) -> f32 {
    normal.dot(light_dir_from_surface).max(0.0)
}

/// Final face intensity: ambient floor plus the light-scaled diffuse term, capped at 1
pub fn shade(normal: Vec3, light_dir_from_surface: Vec3, light: &LightSource, ambient: f32) -> f32 {
    let diffuse = diffuse_intensity(normal, light_dir_from_surface) * light.intensity.max(0.0);
    (ambient + diffuse).min(1.0)
}
