use super::{LoadError, TextureSource};

/// Tightly packed RGBA8 image, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Turns `source` into RGBA8 pixels no larger than `max_dimension` per side.
pub(crate) fn decode(source: &TextureSource, max_dimension: u32) -> Result<RgbaImage, LoadError> {
    let image = match source {
        TextureSource::File(path) => {
            let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| LoadError::Decode {
                    what: path.display().to_string(),
                    reason: e.to_string(),
                })?
                .to_rgba8();
            RgbaImage {
                width: decoded.width(),
                height: decoded.height(),
                pixels: decoded.into_raw(),
            }
        }
        TextureSource::Rgba {
            width,
            height,
            pixels,
        } => {
            let expected = *width as usize * *height as usize * 4;
            if pixels.len() != expected {
                return Err(LoadError::SizeMismatch {
                    width: *width,
                    height: *height,
                    expected,
                    actual: pixels.len(),
                });
            }
            RgbaImage {
                width: *width,
                height: *height,
                pixels: pixels.clone(),
            }
        }
    };

    if image.width == 0 || image.height == 0 {
        return Err(LoadError::Decode {
            what: source.describe(),
            reason: "image has no pixels".to_owned(),
        });
    }
    if image.width > max_dimension || image.height > max_dimension {
        return Err(LoadError::TooLarge {
            width: image.width,
            height: image.height,
            max: max_dimension,
        });
    }
    Ok(image)
}
