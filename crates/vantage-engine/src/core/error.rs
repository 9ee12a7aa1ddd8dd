use thiserror::Error;

use crate::camera::InvalidFrustumError;
use crate::device::{BindingKind, LoadError};
use crate::geometry::AllocationError;
use crate::shader::ShaderError;

/// Fatal failure while building a surface session.
///
/// Setup is deterministic, so none of these are retried.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("vertex buffer allocation failed: {0}")]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("texture slot {slot}: {source}")]
    Texture {
        slot: usize,
        #[source]
        source: LoadError,
    },

    #[error("program does not declare required {kind:?} `{name}`")]
    MissingBinding {
        name: &'static str,
        kind: BindingKind,
    },

    #[error("drawable `{label}` covers vertices {first}..{end} but the buffer holds {vertices}")]
    DrawableOutOfRange {
        label: &'static str,
        first: u32,
        end: u64,
        vertices: u32,
    },

    #[error("drawable `{label}` samples texture slot {slot}, scene has {available}")]
    MissingTexture {
        label: &'static str,
        slot: usize,
        available: usize,
    },

    #[error("initial viewport rejected: {0}")]
    Frustum(#[from] InvalidFrustumError),
}
