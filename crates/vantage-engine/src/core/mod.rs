//! Host-facing renderer.
//!
//! [`Renderer`] is the only type a host talks to. It exposes exactly three
//! entry points, delivered serially on one thread:
//! - `on_create` builds every GPU resource of a surface session
//! - `on_resize` rebuilds the projection for a new viewport
//! - `on_frame` draws one frame at a given time

mod error;
mod guard;
mod renderer;

pub use error::SetupError;
pub use renderer::{Renderer, RendererConfig};
