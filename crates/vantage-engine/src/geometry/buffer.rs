use thiserror::Error;

use crate::device::{BufferHandle, RenderDevice, VertexAttribute};

use super::{AttributeOffsets, VertexLayout};

/// The backing vertex buffer could not be sized as requested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("vertex data is empty")]
    Empty,

    #[error("{floats} floats do not divide into vertices of {per_vertex} floats")]
    Misaligned { floats: usize, per_vertex: u32 },

    #[error("vertex buffer of {requested} bytes exceeds the device limit of {max} bytes")]
    TooLarge { requested: u64, max: u64 },

    #[error("device refused a {requested}-byte vertex buffer: {reason}")]
    Device { requested: u64, reason: String },
}

/// Half-open vertex span `[first, first + count)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexRange {
    pub first: u32,
    pub count: u32,
}

impl VertexRange {
    #[inline]
    pub const fn new(first: u32, count: u32) -> Self {
        Self { first, count }
    }

    #[inline]
    pub const fn end(self) -> u32 {
        self.first + self.count
    }
}

/// Immutable GPU vertex buffer plus the layout it was created with.
#[derive(Debug, Clone)]
pub struct GeometryBuffer {
    handle: BufferHandle,
    layout: VertexLayout,
    offsets: AttributeOffsets,
    vertex_count: u32,
}

impl GeometryBuffer {
    /// Uploads `vertices` (interleaved per `layout`) in native byte order.
    pub fn create<D>(
        device: &mut D,
        vertices: &[f32],
        layout: VertexLayout,
    ) -> Result<Self, AllocationError>
    where
        D: RenderDevice + ?Sized,
    {
        if vertices.is_empty() {
            return Err(AllocationError::Empty);
        }

        let per_vertex = layout.floats_per_vertex();
        if per_vertex == 0 || vertices.len() % per_vertex as usize != 0 {
            return Err(AllocationError::Misaligned {
                floats: vertices.len(),
                per_vertex,
            });
        }

        let requested = std::mem::size_of_val(vertices) as u64;
        let max = device.max_buffer_size();
        if requested > max {
            return Err(AllocationError::TooLarge { requested, max });
        }

        let vertex_count = u32::try_from(vertices.len() / per_vertex as usize)
            .map_err(|_| AllocationError::TooLarge { requested, max })?;

        let handle = device.create_vertex_buffer(bytemuck::cast_slice(vertices))?;

        log::debug!(
            "geometry buffer created: {vertex_count} vertices, stride {} bytes",
            layout.stride()
        );

        Ok(Self {
            handle,
            layout,
            offsets: layout.attribute_offsets(),
            vertex_count,
        })
    }

    #[inline]
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Byte offsets computed once at creation.
    #[inline]
    pub fn attribute_offsets(&self) -> AttributeOffsets {
        self.offsets
    }

    pub fn position_attribute(&self) -> VertexAttribute {
        self.layout.position_attribute()
    }

    pub fn texcoord_attribute(&self) -> Option<VertexAttribute> {
        self.layout.texcoord_attribute()
    }

    /// Returns `true` if `range` lies entirely inside the buffer.
    pub fn contains(&self, range: VertexRange) -> bool {
        range.count > 0
            && range
                .first
                .checked_add(range.count)
                .is_some_and(|end| end <= self.vertex_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingDevice};

    #[test]
    fn create_uploads_native_bytes() {
        let mut dev = RecordingDevice::new();
        let verts = [0.0f32, 1.0, 2.0, 0.5, 0.25, 3.0, 4.0, 5.0, 0.75, 1.0];

        let geo = GeometryBuffer::create(&mut dev, &verts, VertexLayout::POSITION_TEXCOORD)
            .expect("allocation");

        assert_eq!(geo.vertex_count(), 2);
        assert_eq!(geo.attribute_offsets().texcoord, Some(12));
        assert_eq!(
            dev.calls(),
            &[Call::CreateBuffer {
                bytes: bytemuck::cast_slice::<f32, u8>(&verts).to_vec(),
            }]
        );
    }

    #[test]
    fn create_rejects_partial_vertex() {
        let mut dev = RecordingDevice::new();
        let err = GeometryBuffer::create(&mut dev, &[0.0; 7], VertexLayout::POSITION_TEXCOORD)
            .unwrap_err();
        assert_eq!(
            err,
            AllocationError::Misaligned {
                floats: 7,
                per_vertex: 5,
            }
        );
        assert!(dev.calls().is_empty());
    }

    #[test]
    fn create_rejects_empty_and_oversized() {
        let mut dev = RecordingDevice::new();
        assert_eq!(
            GeometryBuffer::create(&mut dev, &[], VertexLayout::POSITION).unwrap_err(),
            AllocationError::Empty
        );

        dev.set_max_buffer_size(16);
        assert_eq!(
            GeometryBuffer::create(&mut dev, &[0.0; 6], VertexLayout::POSITION).unwrap_err(),
            AllocationError::TooLarge {
                requested: 24,
                max: 16,
            }
        );
    }

    #[test]
    fn contains_checks_vertex_span() {
        let mut dev = RecordingDevice::new();
        let geo = GeometryBuffer::create(&mut dev, &[0.0; 12], VertexLayout::POSITION).unwrap();
        assert!(geo.contains(VertexRange::new(0, 4)));
        assert!(geo.contains(VertexRange::new(3, 1)));
        assert!(!geo.contains(VertexRange::new(3, 2)));
        assert!(!geo.contains(VertexRange::new(0, 0)));
        assert!(!geo.contains(VertexRange::new(u32::MAX, 2)));
    }
}
