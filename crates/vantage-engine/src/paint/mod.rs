//! Color model shared by scenes and GPU backends.

pub mod color;

pub use color::Color;
