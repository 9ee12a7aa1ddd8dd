//! Scene catalogue.
//!
//! A scene is plain data (geometry, ordered drawables, textures, camera
//! policy); the frame pipeline executes any of them the same way.

mod catalog;
mod data;
mod drawable;

pub use crate::device::{TextureSource, Topology};
pub use crate::geometry::VertexRange;
pub use catalog::{Scene, SceneKind, DEFAULT_PERIOD_MS};
pub use drawable::{Drawable, Material, Motion};
