use std::collections::BTreeMap;

use super::reflect::{ProgramInterface, UNIFORM_SLOT_SIZE};
use super::{
    BufferHandle, DeviceError, Location, ProgramHandle, TextureHandle, Topology, VertexAttribute,
};

/// Key of a cached render pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub program: ProgramHandle,
    pub topology: Topology,
    /// `(shader location, attribute)`, ascending by location.
    pub attributes: Vec<(u32, VertexAttribute)>,
}

/// One draw, fully resolved at record time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedDraw {
    pub pipeline: PipelineKey,
    /// Byte offset of this draw's uniform slot.
    pub uniform_offset: u32,
    /// One vertex buffer per attribute, in `pipeline.attributes` order.
    pub buffers: Vec<BufferHandle>,
    pub texture: Option<TextureHandle>,
    pub first: u32,
    pub count: u32,
}

/// Bindings that persist between draws of the same frame.
#[derive(Debug, Clone)]
pub(crate) struct DrawState {
    pub program: Option<ProgramHandle>,
    attributes: BTreeMap<u32, (BufferHandle, VertexAttribute)>,
    uniforms: [u8; UNIFORM_SLOT_SIZE as usize],
    pub texture: Option<TextureHandle>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            program: None,
            attributes: BTreeMap::new(),
            uniforms: [0; UNIFORM_SLOT_SIZE as usize],
            texture: None,
        }
    }
}

impl DrawState {
    pub fn bind_attribute(
        &mut self,
        location: Location,
        buffer: BufferHandle,
        attribute: VertexAttribute,
    ) {
        self.attributes.insert(location.0, (buffer, attribute));
    }

    /// Stages `bytes` at `location` inside a block of `block_size` bytes.
    pub fn write_uniform(
        &mut self,
        location: Location,
        bytes: &[u8],
        block_size: u32,
    ) -> Result<(), DeviceError> {
        let start = location.0 as usize;
        let end = start + bytes.len();
        if end > block_size as usize {
            return Err(DeviceError::invalid_state(format!(
                "uniform write of {} bytes at offset {start} overruns the {block_size}-byte block",
                bytes.len()
            )));
        }
        self.uniforms[start..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn uniform_bytes(&self) -> &[u8] {
        &self.uniforms
    }

    /// Vertex bindings for every input `program` reads.
    pub fn vertex_inputs(
        &self,
        program: &ProgramInterface,
    ) -> Result<(Vec<(u32, VertexAttribute)>, Vec<BufferHandle>), DeviceError> {
        let required = program.required_attributes();
        let mut attributes = Vec::with_capacity(required.len());
        let mut buffers = Vec::with_capacity(required.len());
        for location in required {
            let (buffer, attribute) = self.attributes.get(&location).copied().ok_or_else(|| {
                DeviceError::invalid_state(format!(
                    "vertex input at location {location} has no bound attribute"
                ))
            })?;
            attributes.push((location, attribute));
            buffers.push(buffer);
        }
        Ok((attributes, buffers))
    }
}

/// Commands accumulated between `begin_frame` and `end_frame`.
#[derive(Debug, Clone)]
pub(crate) struct FrameRecording {
    pub clear: wgpu::Color,
    pub state: DrawState,
    pub draws: Vec<RecordedDraw>,
    /// Uniform slots, `UNIFORM_SLOT_SIZE` bytes per draw.
    pub uniforms: Vec<u8>,
}

impl FrameRecording {
    pub fn new(clear: wgpu::Color) -> Self {
        Self {
            clear,
            state: DrawState::default(),
            draws: Vec::new(),
            uniforms: Vec::new(),
        }
    }

    /// Snapshots the staged uniforms into a new slot and returns its offset.
    pub fn push_uniform_slot(&mut self) -> u32 {
        let offset = self.uniforms.len() as u32;
        self.uniforms.extend_from_slice(self.state.uniform_bytes());
        offset
    }
}

/// A single acquired surface frame and what was recorded into it.
///
/// Short-lived. Holding the surface texture prevents acquisition of
/// subsequent frames.
pub(crate) struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub recording: FrameRecording,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attr(components: u32, offset: u32) -> VertexAttribute {
        VertexAttribute {
            components,
            stride: 20,
            offset,
        }
    }

    fn program_reading(locations: &[(&str, u32)]) -> ProgramInterface {
        ProgramInterface {
            attributes: locations
                .iter()
                .map(|(n, l)| (n.to_string(), *l))
                .collect::<HashMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn vertex_inputs_follow_location_order() {
        let mut state = DrawState::default();
        let buf = BufferHandle::from_raw(3);
        state.bind_attribute(Location(1), buf, attr(2, 12));
        state.bind_attribute(Location(0), buf, attr(3, 0));

        let program = program_reading(&[("a_Texture", 1), ("a_Position", 0)]);
        let (attributes, buffers) = state.vertex_inputs(&program).unwrap();
        assert_eq!(attributes, [(0, attr(3, 0)), (1, attr(2, 12))]);
        assert_eq!(buffers, [buf, buf]);
    }

    #[test]
    fn unbound_vertex_input_is_invalid_state() {
        let mut state = DrawState::default();
        state.bind_attribute(Location(0), BufferHandle::from_raw(0), attr(3, 0));

        let program = program_reading(&[("a_Position", 0), ("a_Texture", 1)]);
        assert!(matches!(
            state.vertex_inputs(&program),
            Err(DeviceError::InvalidState(_))
        ));
    }

    #[test]
    fn uniform_writes_stay_inside_the_block() {
        let mut state = DrawState::default();
        let mat = [1u8; 64];
        assert!(state.write_uniform(Location(0), &mat, 80).is_ok());
        assert!(state.write_uniform(Location(64), &[2u8; 16], 80).is_ok());
        assert!(state.write_uniform(Location(32), &mat, 80).is_err());

        assert_eq!(&state.uniform_bytes()[..64], &mat);
        assert_eq!(&state.uniform_bytes()[64..80], &[2u8; 16]);
    }

    #[test]
    fn each_draw_gets_its_own_uniform_slot() {
        let mut rec = FrameRecording::new(wgpu::Color::BLACK);
        rec.state.write_uniform(Location(0), &[7u8; 4], 64).unwrap();
        let a = rec.push_uniform_slot();
        rec.state.write_uniform(Location(0), &[9u8; 4], 64).unwrap();
        let b = rec.push_uniform_slot();

        assert_eq!((a, b), (0, UNIFORM_SLOT_SIZE));
        assert_eq!(rec.uniforms[0], 7);
        assert_eq!(rec.uniforms[UNIFORM_SLOT_SIZE as usize], 9);
    }
}
