use crate::geometry::AllocationError;
use crate::paint::Color;
use crate::shader::ShaderError;

use super::{
    BindingKind, BufferHandle, DeviceError, LoadError, Location, ProgramHandle, ShaderHandle,
    ShaderStage, TextureHandle, TextureSource, TextureUnit, Topology, VertexAttribute,
};

/// Turns shader source into linked programs and resolves named binding slots.
pub trait ShaderCompiler {
    /// Compiles one stage. Diagnostics are returned as
    /// [`ShaderError::Compile`].
    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, ShaderError>;

    /// Links a vertex and a fragment stage into a program. Failures are
    /// returned as [`ShaderError::Link`].
    fn link(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, ShaderError>;

    /// Resolves `name` in `program`. `None` when the program does not declare it.
    fn location(&self, program: ProgramHandle, name: &str, kind: BindingKind) -> Option<Location>;
}

/// Produces GPU textures from image sources.
pub trait TextureLoader {
    fn load(&mut self, source: &TextureSource) -> Result<TextureHandle, LoadError>;
}

/// Immediate-style GPU command interface consumed by the frame pipeline.
///
/// Calls made between `begin_frame` and `end_frame` belong to one frame. A
/// device must accept a fresh `begin_frame` after any error, discarding
/// whatever state the failed frame left behind.
pub trait RenderDevice {
    /// Uploads raw vertex bytes (native byte order) into a GPU buffer.
    fn create_vertex_buffer(&mut self, bytes: &[u8]) -> Result<BufferHandle, AllocationError>;

    /// Largest buffer the device can allocate, in bytes.
    fn max_buffer_size(&self) -> u64;

    /// Sets the rasterization viewport after a resize.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Starts a frame, clearing color to `clear` and depth to the far plane.
    fn begin_frame(&mut self, clear: Color) -> Result<(), DeviceError>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError>;

    fn bind_vertex_attribute(
        &mut self,
        location: Location,
        buffer: BufferHandle,
        attribute: VertexAttribute,
    ) -> Result<(), DeviceError>;

    /// Uploads a column-major 4x4 matrix without transposition.
    fn set_uniform_mat4(&mut self, location: Location, value: &[f32; 16])
    -> Result<(), DeviceError>;

    fn set_uniform_vec4(&mut self, location: Location, value: [f32; 4]) -> Result<(), DeviceError>;

    fn bind_texture(&mut self, unit: TextureUnit, texture: TextureHandle)
    -> Result<(), DeviceError>;

    /// Issues one non-indexed draw over `count` vertices starting at `first`.
    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32)
    -> Result<(), DeviceError>;

    /// Finishes the frame and hands it to the presentation engine.
    fn end_frame(&mut self) -> Result<(), DeviceError>;
}

/// Everything a renderer needs from its host GPU.
pub trait Backend: ShaderCompiler + TextureLoader + RenderDevice {}

impl<T> Backend for T where T: ShaderCompiler + TextureLoader + RenderDevice {}
