//! GPU device abstraction and its wgpu implementation.
//!
//! This module is responsible for:
//! - the collaborator traits the renderer draws through ([`ShaderCompiler`],
//!   [`TextureLoader`], [`RenderDevice`])
//! - creating the wgpu Instance/Adapter/Device/Queue and configuring the Surface
//! - recording a frame's draws and replaying them in one depth-tested pass

mod backend;
mod error;
mod frame;
mod gpu;
mod init;
mod reflect;
mod surface;
mod texture;
mod types;
mod wgpu_impl;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::{Backend, RenderDevice, ShaderCompiler, TextureLoader};
pub use error::{DeviceError, LoadError, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;
pub use types::{
    BindingKind, BufferHandle, Location, ProgramHandle, ShaderHandle, ShaderStage, TextureHandle,
    TextureSource, TextureUnit, Topology, VertexAttribute,
};
