//! Coordinate and transform types shared by the camera, scenes and pipeline.
//!
//! World space is right-handed, +Y up. Matrices are column-major and applied to
//! column vectors: `clip = projection * view * model * vertex`.

mod matrix;
mod viewport;

pub use matrix::{frustum, look_at, rotation_degrees, to_column_major, Matrix4};
pub use viewport::Viewport;
