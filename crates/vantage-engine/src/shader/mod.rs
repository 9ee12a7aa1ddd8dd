//! Linked shader programs and binding-slot lookup.
//!
//! Compilation itself is delegated to a [`ShaderCompiler`](crate::device::ShaderCompiler);
//! this module owns the program handle and caches every location it resolves.

mod program;

pub use crate::device::{BindingKind, Location, ShaderStage};
pub use program::{ShaderError, ShaderProgram, ShaderSources};
