//! 4x4 transformation matrices
//!
//! Column-major storage: element (row, col) lives at `m[col * 4 + row]`,
//! so the translation of an affine transform sits in `m[12..15]`.

use std::ops::Mul;
use serde::{Serialize, Deserialize};

use super::math::{Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    pub fn translate(t: Vec3) -> Self {
        let mut r = Self::identity();
        r.m[12] = t.x;
        r.m[13] = t.y;
        r.m[14] = t.z;
        r
    }

    pub fn scale(s: Vec3) -> Self {
        let mut r = Self::identity();
        r.m[0] = s.x;
        r.m[5] = s.y;
        r.m[10] = s.z;
        r
    }

    pub fn rotate_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.m[5] = c;
        r.m[6] = s;
        r.m[9] = -s;
        r.m[10] = c;
        r
    }

    pub fn rotate_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.m[0] = c;
        r.m[2] = -s;
        r.m[8] = s;
        r.m[10] = c;
        r
    }

    pub fn rotate_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.m[0] = c;
        r.m[1] = s;
        r.m[4] = -s;
        r.m[5] = c;
        r
    }

    /// Euler rotation `Rz * Ry * Rx`: X is applied first, Z last
    pub fn rotate_xyz(ax: f32, ay: f32, az: f32) -> Self {
        Self::rotate_z(az) * (Self::rotate_y(ay) * Self::rotate_x(ax))
    }

    /// `a * b`; applying the result equals applying `b` then `a`
    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        let mut m = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a.m[k * 4 + row] * b.m[col * 4 + k];
                }
                m[col * 4 + row] = sum;
            }
        }
        Mat4 { m }
    }

    pub fn transpose(&self) -> Mat4 {
        let mut m = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                m[row * 4 + col] = self.m[col * 4 + row];
            }
        }
        Mat4 { m }
    }

    /// View matrix for a camera at `eye` looking at `target`.
    ///
    /// The camera looks down its local -Z. `up` only needs to be roughly
    /// up; the true up axis is rebuilt as `forward x right`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (eye - target).normalize();
        let right = up.cross(forward).normalize();
        let up = forward.cross(right);

        let mut r = Self::identity();
        r.m[0] = right.x;
        r.m[4] = right.y;
        r.m[8] = right.z;
        r.m[1] = up.x;
        r.m[5] = up.y;
        r.m[9] = up.z;
        r.m[2] = forward.x;
        r.m[6] = forward.y;
        r.m[10] = forward.z;
        r.m[12] = -right.dot(eye);
        r.m[13] = -up.dot(eye);
        r.m[14] = -forward.dot(eye);
        r
    }

    /// OpenGL-style symmetric perspective projection (`fov_y` in radians)
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y / 2.0).tan();
        let mut m = [0.0f32; 16];
        m[0] = f / aspect;
        m[5] = f;
        m[10] = (far + near) / (near - far);
        m[11] = -1.0;
        m[14] = (2.0 * far * near) / (near - far);
        Mat4 { m }
    }

    /// Off-axis perspective projection. Zero-sized extents give identity.
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;
        if width == 0.0 || height == 0.0 || depth == 0.0 {
            return Self::identity();
        }

        let mut m = [0.0f32; 16];
        m[0] = (2.0 * near) / width;
        m[5] = (2.0 * near) / height;
        m[8] = (right + left) / width;
        m[9] = (top + bottom) / height;
        m[10] = -(far + near) / depth;
        m[11] = -1.0;
        m[14] = -(2.0 * far * near) / depth;
        Mat4 { m }
    }

    /// Orthographic projection. Zero-sized extents give identity.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;
        if width == 0.0 || height == 0.0 || depth == 0.0 {
            return Self::identity();
        }

        let mut r = Self::identity();
        r.m[0] = 2.0 / width;
        r.m[5] = 2.0 / height;
        r.m[10] = -2.0 / depth;
        r.m[12] = -(right + left) / width;
        r.m[13] = -(top + bottom) / height;
        r.m[14] = -(far + near) / depth;
        r
    }

    /// Full homogeneous transform of a point (w = 1), without the divide
    pub fn transform_vec4(&self, p: Vec3) -> Vec4 {
        let m = &self.m;
        Vec4 {
            x: m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            y: m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            z: m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
            w: m[3] * p.x + m[7] * p.y + m[11] * p.z + m[15],
        }
    }

    /// Transform a point including the w-divide.
    /// When w is exactly zero the raw homogeneous xyz is returned.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let h = self.transform_vec4(p);
        h.perspective_divide().unwrap_or_else(|| h.xyz())
    }

    /// Transform a direction with the upper-left 3x3 only (no translation)
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: m[0] * d.x + m[4] * d.y + m[8] * d.z,
            y: m[1] * d.x + m[5] * d.y + m[9] * d.z,
            z: m[2] * d.x + m[6] * d.y + m[10] * d.z,
        }
    }

    /// Inverse-transpose of the upper-left 3x3, embedded in a 4x4.
    /// Returns `None` when that block is singular.
    pub fn normal_matrix(&self) -> Option<Mat4> {
        let c0 = Vec3::new(self.m[0], self.m[1], self.m[2]);
        let c1 = Vec3::new(self.m[4], self.m[5], self.m[6]);
        let c2 = Vec3::new(self.m[8], self.m[9], self.m[10]);

        let det = c0.dot(c1.cross(c2));
        if det.abs() < 1e-12 {
            return None;
        }

        // Rows of the inverse are these cross products / det, so they are
        // the columns of the inverse-transpose.
        let inv_det = 1.0 / det;
        let n0 = c1.cross(c2).scale(inv_det);
        let n1 = c2.cross(c0).scale(inv_det);
        let n2 = c0.cross(c1).scale(inv_det);

        let mut r = Self::identity();
        r.m[0] = n0.x;
        r.m[1] = n0.y;
        r.m[2] = n0.z;
        r.m[4] = n1.x;
        r.m[5] = n1.y;
        r.m[6] = n1.z;
        r.m[8] = n2.x;
        r.m[9] = n2.y;
        r.m[10] = n2.z;
        Some(r)
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        Mat4::multiply(&self, &other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

    fn assert_mat_eq(a: &Mat4, b: &Mat4, eps: f32) {
        for i in 0..16 {
            assert!((a.m[i] - b.m[i]).abs() < eps, "element {}: {} != {}", i, a.m[i], b.m[i]);
        }
    }

    fn assert_vec_eq(a: Vec3, b: Vec3, eps: f32) {
        assert!(
            (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps && (a.z - b.z).abs() < eps,
            "{:?} != {:?}",
            a,
            b
        );
    }

    fn sample_matrix() -> Mat4 {
        Mat4::translate(Vec3::new(1.0, -2.0, 3.0))
            * Mat4::rotate_xyz(0.3, -1.1, 2.0)
            * Mat4::scale(Vec3::new(2.0, 0.5, 1.5))
    }

    #[test]
    fn test_identity_is_neutral() {
        let a = sample_matrix();
        assert_mat_eq(&Mat4::multiply(&a, &Mat4::identity()), &a, 1e-6);
        assert_mat_eq(&Mat4::multiply(&Mat4::identity(), &a), &a, 1e-6);
        let p = Mat4::perspective(FRAC_PI_3, 1.5, 0.1, 100.0);
        assert_mat_eq(&(p * Mat4::IDENTITY), &p, 1e-6);
    }

    #[test]
    fn test_translate_is_exact() {
        let t = Vec3::new(0.25, -3.5, 10.0);
        let p = Vec3::new(1.5, 2.0, -0.75);
        assert_eq!(Mat4::translate(t).transform_point(p), p + t);
    }

    #[test]
    fn test_translation_ignored_for_directions() {
        let m = Mat4::translate(Vec3::new(5.0, 5.0, 5.0));
        let d = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(m.transform_direction(d), d);
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let p = Mat4::rotate_z(FRAC_PI_2).transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert_vec_eq(p, Vec3::new(0.0, 1.0, 0.0), 1e-6);
    }

    #[test]
    fn test_rotate_xyz_applies_x_first() {
        // X first sends +Y to +Z, then Y sends +Z to +X
        let m = Mat4::rotate_xyz(FRAC_PI_2, FRAC_PI_2, 0.0);
        let p = m.transform_point(Vec3::new(0.0, 1.0, 0.0));
        assert_vec_eq(p, Vec3::new(1.0, 0.0, 0.0), 1e-6);
    }

    #[test]
    fn test_look_at_puts_target_in_front() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::UP);
        assert_vec_eq(view.transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -5.0), 1e-5);
        // Up stays up
        assert_vec_eq(view.transform_direction(Vec3::UP), Vec3::UP, 1e-5);
    }

    #[test]
    fn test_look_at_basis_is_orthonormal() {
        let view = Mat4::look_at(Vec3::new(3.0, 4.0, -6.0), Vec3::new(0.5, 0.0, 0.0), Vec3::UP);
        let rows: Vec<Vec3> = (0..3)
            .map(|r| Vec3::new(view.get(r, 0), view.get(r, 1), view.get(r, 2)))
            .collect();
        for i in 0..3 {
            assert!((rows[i].length() - 1.0).abs() < 1e-5);
            for j in (i + 1)..3 {
                assert!(rows[i].dot(rows[j]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_perspective_layout() {
        let p = Mat4::perspective(FRAC_PI_3, 1.0, 0.1, 100.0);
        assert_eq!(p.m[11], -1.0);
        assert_eq!(p.m[15], 0.0);
    }

    #[test]
    fn test_perspective_maps_near_and_far_planes() {
        let p = Mat4::perspective(FRAC_PI_3, 1.0, 1.0, 10.0);
        let near = p.transform_point(Vec3::new(0.0, 0.0, -1.0));
        let far = p.transform_point(Vec3::new(0.0, 0.0, -10.0));
        assert!((near.z + 1.0).abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_frustum_matches_symmetric_perspective() {
        let (near, far, fov, aspect) = (0.1, 100.0, FRAC_PI_3, 1.25);
        let top = near * (fov / 2.0).tan();
        let right = top * aspect;
        let f = Mat4::frustum(-right, right, -top, top, near, far);
        let p = Mat4::perspective(fov, aspect, near, far);
        assert_mat_eq(&f, &p, 1e-4);
    }

    #[test]
    fn test_frustum_degenerate_is_identity() {
        assert_eq!(Mat4::frustum(1.0, 1.0, -1.0, 1.0, 0.1, 10.0), Mat4::IDENTITY);
    }

    #[test]
    fn test_orthographic_maps_box_to_ndc() {
        let o = Mat4::orthographic(-2.0, 2.0, -1.0, 1.0, 1.0, 3.0);
        assert_vec_eq(o.transform_point(Vec3::new(2.0, 1.0, -3.0)), Vec3::new(1.0, 1.0, 1.0), 1e-6);
        assert_vec_eq(o.transform_point(Vec3::new(-2.0, -1.0, -1.0)), Vec3::new(-1.0, -1.0, -1.0), 1e-6);
    }

    #[test]
    fn test_transform_point_zero_w_returns_raw() {
        let mut m = Mat4::identity();
        m.m[15] = 0.0;
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(m.transform_point(p), p);
    }

    #[test]
    fn test_transpose_round_trip() {
        let a = sample_matrix();
        assert_eq!(a.transpose().transpose(), a);
        assert_eq!(a.transpose().get(0, 3), a.get(3, 0));
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        // Plane x = y stretched along X: its normal must lean toward +Y
        let m = Mat4::scale(Vec3::new(2.0, 1.0, 1.0));
        let n = Vec3::new(1.0, -1.0, 0.0).normalize();
        let exact = m.normal_matrix().unwrap().transform_direction(n).normalize();
        // Tangent of the stretched plane is (2, 1, 0)
        assert!(exact.dot(Vec3::new(2.0, 1.0, 0.0)).abs() < 1e-5);
    }

    #[test]
    fn test_normal_matrix_singular() {
        assert!(Mat4::scale(Vec3::new(1.0, 0.0, 1.0)).normal_matrix().is_none());
    }
}
