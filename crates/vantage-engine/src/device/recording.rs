//! In-memory device that records every call, for tests.

use std::cell::Cell;
use std::collections::HashMap;

use crate::geometry::AllocationError;
use crate::paint::Color;
use crate::shader::ShaderError;

use super::{
    BindingKind, BufferHandle, DeviceError, LoadError, Location, ProgramHandle, RenderDevice,
    ShaderCompiler, ShaderHandle, ShaderStage, TextureHandle, TextureLoader, TextureSource,
    TextureUnit, Topology, VertexAttribute,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateBuffer {
        bytes: Vec<u8>,
    },
    LoadTexture(String),
    SetViewport(u32, u32),
    BeginFrame(Color),
    UseProgram(ProgramHandle),
    BindAttribute {
        location: Location,
        buffer: BufferHandle,
        attribute: VertexAttribute,
    },
    UniformMat4 {
        location: Location,
        value: [f32; 16],
    },
    UniformVec4 {
        location: Location,
        value: [f32; 4],
    },
    BindTexture {
        unit: TextureUnit,
        texture: TextureHandle,
    },
    Draw {
        topology: Topology,
        first: u32,
        count: u32,
    },
    EndFrame,
}

pub(crate) struct RecordingDevice {
    calls: Vec<Call>,

    compiled: Vec<ShaderStage>,
    linked: usize,
    buffers: u32,
    textures: u32,

    attributes: HashMap<&'static str, u32>,
    uniforms: HashMap<&'static str, u32>,
    location_queries: Cell<usize>,

    max_buffer_size: u64,
    compile_failure: Option<(ShaderStage, String)>,
    link_failure: Option<String>,
    allocation_failure: Option<String>,
    load_failure: Option<String>,
    begin_failure: Option<DeviceError>,
    draw_failure: Option<(usize, DeviceError)>,
    draws_this_frame: usize,
}

impl RecordingDevice {
    pub(crate) fn new() -> Self {
        Self {
            calls: Vec::new(),
            compiled: Vec::new(),
            linked: 0,
            buffers: 0,
            textures: 0,
            attributes: HashMap::from([("a_Position", 0), ("a_Texture", 1)]),
            uniforms: HashMap::from([("u_Matrix", 0), ("u_Color", 64), ("u_TextureUnit", 0)]),
            location_queries: Cell::new(0),
            max_buffer_size: 1 << 20,
            compile_failure: None,
            link_failure: None,
            allocation_failure: None,
            load_failure: None,
            begin_failure: None,
            draw_failure: None,
            draws_this_frame: 0,
        }
    }

    pub(crate) fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub(crate) fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub(crate) fn compiled_stages(&self) -> Vec<ShaderStage> {
        self.compiled.clone()
    }

    pub(crate) fn linked_programs(&self) -> usize {
        self.linked
    }

    pub(crate) fn location_queries(&self) -> usize {
        self.location_queries.get()
    }

    /// Makes the program stop declaring `name` (attribute or uniform).
    pub(crate) fn without_binding(&mut self, name: &str) {
        self.attributes.remove(name);
        self.uniforms.remove(name);
    }

    pub(crate) fn set_max_buffer_size(&mut self, bytes: u64) {
        self.max_buffer_size = bytes;
    }

    pub(crate) fn fail_compile(&mut self, stage: ShaderStage, log: &str) {
        self.compile_failure = Some((stage, log.to_owned()));
    }

    pub(crate) fn fail_link(&mut self, log: &str) {
        self.link_failure = Some(log.to_owned());
    }

    pub(crate) fn fail_allocation(&mut self, reason: &str) {
        self.allocation_failure = Some(reason.to_owned());
    }

    pub(crate) fn fail_load(&mut self, reason: &str) {
        self.load_failure = Some(reason.to_owned());
    }

    /// The next `begin_frame` fails with `err`.
    pub(crate) fn fail_begin_frame(&mut self, err: DeviceError) {
        self.begin_failure = Some(err);
    }

    /// The draw at `index` within the next frame fails once.
    pub(crate) fn fail_draw(&mut self, index: usize) {
        self.fail_draw_with(index, DeviceError::invalid_state("simulated draw failure"));
    }

    pub(crate) fn fail_draw_with(&mut self, index: usize, err: DeviceError) {
        self.draw_failure = Some((index, err));
    }
}

impl ShaderCompiler for RecordingDevice {
    fn compile(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderHandle, ShaderError> {
        if let Some((failing, log)) = &self.compile_failure {
            if *failing == stage {
                return Err(ShaderError::Compile {
                    stage,
                    log: log.clone(),
                });
            }
        }
        self.compiled.push(stage);
        Ok(ShaderHandle::from_raw(self.compiled.len() as u32 - 1))
    }

    fn link(
        &mut self,
        _vertex: ShaderHandle,
        _fragment: ShaderHandle,
    ) -> Result<ProgramHandle, ShaderError> {
        if let Some(log) = &self.link_failure {
            return Err(ShaderError::Link { log: log.clone() });
        }
        self.linked += 1;
        Ok(ProgramHandle::from_raw(self.linked as u32 - 1))
    }

    fn location(&self, _program: ProgramHandle, name: &str, kind: BindingKind) -> Option<Location> {
        self.location_queries.set(self.location_queries.get() + 1);
        let table = match kind {
            BindingKind::Attribute => &self.attributes,
            BindingKind::Uniform => &self.uniforms,
        };
        table.get(name).copied().map(Location)
    }
}

impl TextureLoader for RecordingDevice {
    fn load(&mut self, source: &TextureSource) -> Result<TextureHandle, LoadError> {
        if let Some(reason) = &self.load_failure {
            return Err(LoadError::Decode {
                what: source.describe(),
                reason: reason.clone(),
            });
        }
        self.calls.push(Call::LoadTexture(source.describe()));
        self.textures += 1;
        Ok(TextureHandle::from_raw(self.textures - 1))
    }
}

impl RenderDevice for RecordingDevice {
    fn create_vertex_buffer(&mut self, bytes: &[u8]) -> Result<BufferHandle, AllocationError> {
        if let Some(reason) = &self.allocation_failure {
            return Err(AllocationError::Device {
                requested: bytes.len() as u64,
                reason: reason.clone(),
            });
        }
        self.calls.push(Call::CreateBuffer {
            bytes: bytes.to_vec(),
        });
        self.buffers += 1;
        Ok(BufferHandle::from_raw(self.buffers - 1))
    }

    fn max_buffer_size(&self) -> u64 {
        self.max_buffer_size
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::SetViewport(width, height));
    }

    fn begin_frame(&mut self, clear: Color) -> Result<(), DeviceError> {
        self.draws_this_frame = 0;
        if let Some(err) = self.begin_failure.take() {
            return Err(err);
        }
        self.calls.push(Call::BeginFrame(clear));
        Ok(())
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError> {
        self.calls.push(Call::UseProgram(program));
        Ok(())
    }

    fn bind_vertex_attribute(
        &mut self,
        location: Location,
        buffer: BufferHandle,
        attribute: VertexAttribute,
    ) -> Result<(), DeviceError> {
        self.calls.push(Call::BindAttribute {
            location,
            buffer,
            attribute,
        });
        Ok(())
    }

    fn set_uniform_mat4(
        &mut self,
        location: Location,
        value: &[f32; 16],
    ) -> Result<(), DeviceError> {
        self.calls.push(Call::UniformMat4 {
            location,
            value: *value,
        });
        Ok(())
    }

    fn set_uniform_vec4(&mut self, location: Location, value: [f32; 4]) -> Result<(), DeviceError> {
        self.calls.push(Call::UniformVec4 { location, value });
        Ok(())
    }

    fn bind_texture(
        &mut self,
        unit: TextureUnit,
        texture: TextureHandle,
    ) -> Result<(), DeviceError> {
        self.calls.push(Call::BindTexture { unit, texture });
        Ok(())
    }

    fn draw_arrays(
        &mut self,
        topology: Topology,
        first: u32,
        count: u32,
    ) -> Result<(), DeviceError> {
        let index = self.draws_this_frame;
        self.draws_this_frame += 1;

        if self.draw_failure.as_ref().is_some_and(|(at, _)| *at == index) {
            if let Some((_, err)) = self.draw_failure.take() {
                return Err(err);
            }
        }

        self.calls.push(Call::Draw {
            topology,
            first,
            count,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), DeviceError> {
        self.calls.push(Call::EndFrame);
        Ok(())
    }
}
