use std::path::PathBuf;

/// Opaque handle to a vertex buffer owned by a backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

/// Opaque handle to a compiled (unlinked) shader stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderHandle(u32);

/// Opaque handle to a linked vertex + fragment program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u32);

/// Opaque handle to an uploaded 2D texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

macro_rules! raw_index {
    ($($ty:ident),*) => {$(
        impl $ty {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

raw_index!(BufferHandle, ShaderHandle, ProgramHandle, TextureHandle);

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// What a named binding slot refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Per-vertex input.
    Attribute,
    /// Per-draw constant (matrices, colors, texture units).
    Uniform,
}

/// Resolved binding slot inside a linked program.
///
/// The meaning of the raw value is backend specific (attribute index, uniform
/// byte offset, texture binding); the core only passes it back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Location(pub u32);

/// Primitive assembly mode for a draw call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Topology {
    TriangleStrip,
    TriangleList,
    Lines,
}

/// Layout of one float attribute inside an interleaved vertex buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Number of `f32` components (1..=4).
    pub components: u32,
    /// Distance between consecutive vertices in bytes.
    pub stride: u32,
    /// Byte offset of the first component within a vertex.
    pub offset: u32,
}

/// Texture sampling unit. Scenes only use unit 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureUnit(pub u32);

impl TextureUnit {
    pub const ZERO: Self = Self(0);
}

/// Where a texture's pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    /// Encoded image file (PNG or JPEG), decoded by the loader.
    File(PathBuf),
    /// Raw tightly packed RGBA8 pixels.
    Rgba {
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
}

impl TextureSource {
    /// Procedural two-tone checkerboard with `cells` squares per side.
    pub fn checkerboard(size: u32, cells: u32, light: [u8; 4], dark: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let texel = if ((x / cell) + (y / cell)) % 2 == 0 { light } else { dark };
                pixels.extend_from_slice(&texel);
            }
        }
        TextureSource::Rgba {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            TextureSource::File(path) => path.display().to_string(),
            TextureSource::Rgba { width, height, .. } => format!("rgba {width}x{height}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_cells() {
        let light = [255, 255, 255, 255];
        let dark = [0, 0, 0, 255];
        let TextureSource::Rgba { width, height, pixels } =
            TextureSource::checkerboard(4, 2, light, dark)
        else {
            panic!("expected raw pixels");
        };
        assert_eq!((width, height), (4, 4));
        assert_eq!(pixels.len(), 4 * 4 * 4);

        let texel = |x: usize, y: usize| &pixels[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(texel(0, 0), &light);
        assert_eq!(texel(2, 0), &dark);
        assert_eq!(texel(2, 2), &light);
    }
}
