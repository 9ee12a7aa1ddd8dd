//! Matrix construction helpers.
//!
//! Convention (fixed for the whole engine):
//! - `Matrix4` is column-major, 16 contiguous `f32`s
//! - vectors are columns, transforms compose right-to-left
//! - clip space follows the GL convention (`z` in `[-1, 1]`); GPU backends with
//!   a different depth range remap it in their shaders

use glam::{Mat4, Vec3, Vec4};

/// 4x4 column-major transform.
pub type Matrix4 = Mat4;

/// Builds a perspective frustum from explicit clip-plane extents at `near`.
///
/// Equivalent to the classic `glFrustum` matrix.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;

    Mat4::from_cols(
        Vec4::new(2.0 * near / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / height, 0.0, 0.0),
        Vec4::new(
            (right + left) / width,
            (top + bottom) / height,
            -(far + near) / depth,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, -2.0 * far * near / depth, 0.0),
    )
}

/// Right-handed look-at view matrix.
///
/// `up` must not be parallel to `center - eye`; the resulting orientation is
/// undefined otherwise.
#[inline]
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Matrix4 {
    Mat4::look_at_rh(eye, center, up)
}

/// Rotation of `degrees` about `axis` (normalized internally).
#[inline]
pub fn rotation_degrees(degrees: f32, axis: Vec3) -> Matrix4 {
    Mat4::from_axis_angle(axis.normalize(), degrees.to_radians())
}

/// Flattens a matrix for upload, column-major without transpose.
#[inline]
pub fn to_column_major(m: &Matrix4) -> [f32; 16] {
    m.to_cols_array()
}
