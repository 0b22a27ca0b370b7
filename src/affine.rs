//! Voxel to world coordinate transforms of NIfTI-1 headers.
//!
//! This module is only available with the `nalgebra_affine` feature.

use crate::header::NiftiHeader;
use nalgebra::{Matrix3, Matrix4, Quaternion, Vector3};

/// 3x3 linear part of an affine transform.
pub type Affine3 = Matrix3<f32>;
/// 4x4 affine transform in homogeneous coordinates.
pub type Affine4 = Matrix4<f32>;

impl NiftiHeader {
    /// The transform from voxel indices to world coordinates.
    ///
    /// The sform is used when `sform_code` is set, the qform when
    /// `qform_code` is set, and a plain scaling by the voxel spacings
    /// otherwise.
    pub fn affine(&self) -> Affine4 {
        if self.sform_code > 0 {
            self.sform_affine()
        } else if self.qform_code > 0 {
            self.qform_affine()
        } else {
            self.spacing_affine()
        }
    }

    /// The transform stored in the `srow_*` rows.
    #[rustfmt::skip]
    pub fn sform_affine(&self) -> Affine4 {
        let (x, y, z) = (self.srow_x, self.srow_y, self.srow_z);
        Affine4::new(
            x[0], x[1], x[2], x[3],
            y[0], y[1], y[2], y[3],
            z[0], z[1], z[2], z[3],
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// The transform described by the quaternion, the spacings, the
    /// `pixdim[0]` handedness factor and the offsets.
    #[rustfmt::skip]
    pub fn qform_affine(&self) -> Affine4 {
        let q = fill_positive(Vector3::new(
            self.quatern_b,
            self.quatern_c,
            self.quatern_d,
        ));
        let qfac = if self.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let rotation = quaternion_to_affine(q);
        let scale = Vector3::new(self.pixdim[1], self.pixdim[2], qfac * self.pixdim[3]);
        let m = rotation * Matrix3::from_diagonal(&scale);
        Affine4::new(
            m[(0, 0)], m[(0, 1)], m[(0, 2)], self.quatern_x,
            m[(1, 0)], m[(1, 1)], m[(1, 2)], self.quatern_y,
            m[(2, 0)], m[(2, 1)], m[(2, 2)], self.quatern_z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    fn spacing_affine(&self) -> Affine4 {
        Affine4::new(
            self.pixdim[1], 0.0, 0.0, 0.0,
            0.0, self.pixdim[2], 0.0, 0.0,
            0.0, 0.0, self.pixdim[3], 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// Complete a unit quaternion from its vector part, with a non-negative
/// real part. Slightly out of range inputs get a real part of 0.
fn fill_positive(xyz: Vector3<f32>) -> Quaternion<f32> {
    let w2 = 1.0 - f64::from(xyz.dot(&xyz));
    let w = if w2 > 0.0 { w2.sqrt() as f32 } else { 0.0 };
    Quaternion::new(w, xyz.x, xyz.y, xyz.z)
}

/// Rotation matrix of a quaternion, which need not be normalized.
#[rustfmt::skip]
fn quaternion_to_affine(q: Quaternion<f32>) -> Affine3 {
    let nq = q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k;
    if nq < f32::EPSILON {
        return Affine3::identity();
    }
    let s = 2.0 / nq;
    let (x, y, z) = (q.i * s, q.j * s, q.k * s);
    let (wx, wy, wz) = (q.w * x, q.w * y, q.w * z);
    let (xx, xy, xz) = (q.i * x, q.i * y, q.i * z);
    let (yy, yz, zz) = (q.j * y, q.j * z, q.k * z);
    Affine3::new(
        1.0 - (yy + zz), xy - wz, xz + wy,
        xy + wz, 1.0 - (xx + zz), yz - wx,
        xz - wy, yz + wx, 1.0 - (xx + yy),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn spacing_only() {
        let h = NiftiHeader {
            pixdim: [1., 2., 3., 4., 1., 1., 1., 1.],
            ..Default::default()
        };
        assert_eq!(h.affine(), Affine4::new_nonuniform_scaling(&Vector3::new(2., 3., 4.)));
    }

    #[test]
    fn sform_takes_precedence() {
        let h = NiftiHeader {
            sform_code: 1,
            qform_code: 1,
            srow_x: [-2., 0., 0., 90.],
            srow_y: [0., 2., 0., -126.],
            srow_z: [0., 0., 2., -72.],
            ..Default::default()
        };
        let a = h.affine();
        assert_eq!(a[(0, 0)], -2.);
        assert_eq!(a[(1, 3)], -126.);
        assert_eq!(a[(3, 3)], 1.);
    }

    #[test]
    #[rustfmt::skip]
    fn qform_with_flip() {
        // 180 degrees around z, left-handed
        let h = NiftiHeader {
            qform_code: 1,
            quatern_d: 1.,
            quatern_x: 10.,
            quatern_y: 20.,
            quatern_z: 30.,
            pixdim: [-1., 2., 2., 3., 1., 1., 1., 1.],
            ..Default::default()
        };
        let expected = Affine4::new(
            -2., 0., 0., 10.,
            0., -2., 0., 20.,
            0., 0., -3., 30.,
            0., 0., 0., 1.,
        );
        assert_abs_diff_eq!(h.affine(), expected, epsilon = 1e-6);
    }
}
