//! Vector math for 3D rendering
//!
//! `Vec3` is a plain Cartesian value type. Its spherical form is derived on
//! demand through [`Vec3::spherical`], so it always agrees with `x`, `y`, `z`.

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Spherical coordinates: radius, azimuth (around Z from +X), polar angle (from +Z)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spherical {
    pub r: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn new(r: f32, theta: f32, phi: f32) -> Self {
        Self { r, theta, phi }
    }

    pub fn to_cartesian(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3 {
            x: self.r * sin_phi * self.theta.cos(),
            y: self.r * sin_phi * self.theta.sin(),
            z: self.r * self.phi.cos(),
        }
    }
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_spherical(r: f32, theta: f32, phi: f32) -> Self {
        Spherical::new(r, theta, phi).to_cartesian()
    }

    /// Spherical view of this vector. `phi` is 0 for the zero vector.
    pub fn spherical(self) -> Spherical {
        let r = self.length();
        Spherical {
            r,
            theta: self.y.atan2(self.x),
            phi: if r == 0.0 { 0.0 } else { (self.z / r).clamp(-1.0, 1.0).acos() },
        }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Exact normalization. The zero vector normalizes to zero.
    pub fn normalize(self) -> Vec3 {
        let l = self.length();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    /// Approximate normalization using the bit-level inverse square root.
    ///
    /// One Newton-Raphson step keeps the relative error under ~0.2%.
    /// The zero vector normalizes to zero.
    pub fn normalize_fast(self) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq == 0.0 || !len_sq.is_finite() {
            return Vec3::ZERO;
        }
        self.scale(fast_inv_sqrt(len_sq))
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn negate(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self).scale(t)
    }

    /// Spherical linear interpolation between two (roughly) unit vectors.
    /// Nearly parallel inputs return `self` unchanged.
    pub fn slerp(self, other: Vec3, t: f32) -> Vec3 {
        let angle = self.dot(other).clamp(-1.0, 1.0).acos();
        if angle.abs() < 0.0001 {
            return self;
        }

        let sin_angle = angle.sin();
        let s0 = ((1.0 - t) * angle).sin() / sin_angle;
        let s1 = (t * angle).sin() / sin_angle;
        self.scale(s0) + other.scale(s1)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        self.negate()
    }
}

/// Homogeneous 4-component vector (clip space)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_point(p: Vec3) -> Self {
        Self { x: p.x, y: p.y, z: p.z, w: 1.0 }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Divide by `w`. Returns `None` when `w` is exactly zero.
    pub fn perspective_divide(self) -> Option<Vec3> {
        if self.w == 0.0 {
            return None;
        }
        Some(Vec3::new(self.x / self.w, self.y / self.w, self.z / self.w))
    }
}

/// Approximate `1 / sqrt(x)`: magic-constant initial guess plus one Newton step
pub fn fast_inv_sqrt(x: f32) -> f32 {
    let half = 0.5 * x;
    let guess = f32::from_bits(0x5f37_59df - (x.to_bits() >> 1));
    guess * (1.5 - half * guess * guess)
}

/// Cubic Bézier curve in Bernstein form. `t` is expected in [0, 1].
pub fn bezier_cubic(t: f32, p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    // Endpoints are returned as-is so t = 0 and t = 1 are exact
    if t == 0.0 {
        return p0;
    }
    if t == 1.0 {
        return p3;
    }

    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;

    p0.scale(uu * u) + p1.scale(3.0 * uu * t) + p2.scale(3.0 * u * tt) + p3.scale(tt * t)
}
