//! Conversion between the game's Y-up axis convention and a right-handed Z-up convention.
//!
//! Positions and normals are remapped with a pure axis permutation plus one negation, so lengths
//! are preserved and normals need no re-normalization. Bone transforms get the same rotation
//! applied from the left.

use glam::{Mat4, Vec3, Vec4};

/// A 90° rotation about the X axis, written out exactly so no trigonometric rounding leaks into
/// converted matrices. Applied to a point it is identical to [`to_z_up`].
pub const AXIS_CONVERSION: Mat4 = Mat4::from_cols(Vec4::X, Vec4::Z, Vec4::NEG_Y, Vec4::W);

/// Maps a Y-up vector into Z-up space: `(x, y, z) -> (x, -z, y)`.
#[inline]
pub fn to_z_up(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}

/// Inverse of [`to_z_up`]: `(x, y, z) -> (x, z, -y)`.
#[inline]
pub fn to_y_up(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Rotates a bone transform into Z-up space.
///
/// The matrix must already be a direct bone transform. Converting an on-disk inverse world
/// matrix has to invert first and rotate second; the other order yields a different matrix.
#[inline]
pub fn bone_to_z_up(m: Mat4) -> Mat4 {
    AXIS_CONVERSION * m
}

/// Builds a 4x4 matrix from the three stored rows of an affine transform. The fourth row is
/// implicitly `[0, 0, 0, 1]`.
pub fn matrix_from_rows(rows: [[f32; 4]; 3]) -> Mat4 {
    let [r0, r1, r2] = rows;

    Mat4::from_cols_array_2d(&[r0, r1, r2, [0.0, 0.0, 0.0, 1.0]]).transpose()
}
