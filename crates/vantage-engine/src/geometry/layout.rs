use crate::device::VertexAttribute;

const FLOAT_SIZE: u32 = std::mem::size_of::<f32>() as u32;

/// Interleaved vertex layout: a position followed by an optional texcoord.
///
/// Stride and offsets are pure functions of the component counts, so a layout
/// fixed at scene construction yields the same attribute bindings every draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub position_components: u32,
    pub texcoord_components: u32,
}

/// Byte offsets of each attribute inside one vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttributeOffsets {
    pub position: u32,
    pub texcoord: Option<u32>,
}

impl VertexLayout {
    /// `xyz`
    pub const POSITION: Self = Self {
        position_components: 3,
        texcoord_components: 0,
    };

    /// `xyz uv`
    pub const POSITION_TEXCOORD: Self = Self {
        position_components: 3,
        texcoord_components: 2,
    };

    #[inline]
    pub const fn floats_per_vertex(self) -> u32 {
        self.position_components + self.texcoord_components
    }

    /// `(position + texcoord) * 4` bytes.
    #[inline]
    pub const fn stride(self) -> u32 {
        self.floats_per_vertex() * FLOAT_SIZE
    }

    pub fn attribute_offsets(self) -> AttributeOffsets {
        AttributeOffsets {
            position: 0,
            texcoord: (self.texcoord_components > 0)
                .then_some(self.position_components * FLOAT_SIZE),
        }
    }

    pub fn position_attribute(self) -> VertexAttribute {
        VertexAttribute {
            components: self.position_components,
            stride: self.stride(),
            offset: self.attribute_offsets().position,
        }
    }

    pub fn texcoord_attribute(self) -> Option<VertexAttribute> {
        self.attribute_offsets().texcoord.map(|offset| VertexAttribute {
            components: self.texcoord_components,
            stride: self.stride(),
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textured_layout_matches_interleaved_packing() {
        let l = VertexLayout::POSITION_TEXCOORD;
        assert_eq!(l.stride(), 20);
        assert_eq!(
            l.attribute_offsets(),
            AttributeOffsets {
                position: 0,
                texcoord: Some(12),
            }
        );
        assert_eq!(
            l.texcoord_attribute(),
            Some(VertexAttribute {
                components: 2,
                stride: 20,
                offset: 12,
            })
        );
    }

    #[test]
    fn position_only_layout_has_no_texcoord() {
        let l = VertexLayout::POSITION;
        assert_eq!(l.stride(), 12);
        assert_eq!(l.attribute_offsets().texcoord, None);
        assert_eq!(l.texcoord_attribute(), None);
    }
}
