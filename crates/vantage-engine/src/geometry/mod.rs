//! Vertex storage.
//!
//! A `GeometryBuffer` is written once at surface creation and never mutated;
//! drawables address it through `VertexRange`s.

mod buffer;
mod layout;

pub use buffer::{AllocationError, GeometryBuffer, VertexRange};
pub use layout::{AttributeOffsets, VertexLayout};
