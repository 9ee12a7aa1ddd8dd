use thiserror::Error;

use crate::coords::{frustum, Matrix4, Viewport};

/// A projection cannot be built from these inputs.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum InvalidFrustumError {
    #[error("degenerate viewport {width}x{height}")]
    Viewport { width: u32, height: u32 },

    #[error("invalid depth range: near={near}, far={far} (need 0 < near < far)")]
    DepthRange { near: f32, far: f32 },
}

/// Fixed projection constants of a scene.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrustumConfig {
    pub near: f32,
    pub far: f32,
    /// Half extent of the short screen axis at the near plane.
    pub half_extent: f32,
}

impl FrustumConfig {
    pub fn validate(&self) -> Result<(), InvalidFrustumError> {
        let ok = self.near > 0.0
            && self.far > self.near
            && self.near.is_finite()
            && self.far.is_finite()
            && self.half_extent > 0.0;
        if ok {
            Ok(())
        } else {
            Err(InvalidFrustumError::DepthRange {
                near: self.near,
                far: self.far,
            })
        }
    }
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self {
            near: 2.0,
            far: 12.0,
            half_extent: 1.0,
        }
    }
}

/// Clip-plane extents at the near plane after aspect correction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrustumExtents {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl FrustumExtents {
    /// Symmetric extents scaled along the longer screen axis.
    ///
    /// The shorter axis keeps `[-half_extent, half_extent]` and so always spans
    /// the full `[-1, 1]` of clip space; the longer axis is widened by the
    /// aspect ratio.
    pub fn for_viewport(
        viewport: Viewport,
        config: FrustumConfig,
    ) -> Result<Self, InvalidFrustumError> {
        if !viewport.is_valid() {
            return Err(InvalidFrustumError::Viewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        config.validate()?;

        let (w, h) = (viewport.width as f32, viewport.height as f32);
        let e = config.half_extent;
        let (mut left, mut right, mut bottom, mut top) = (-e, e, -e, e);

        if viewport.is_landscape() {
            let ratio = w / h;
            left *= ratio;
            right *= ratio;
        } else {
            let ratio = h / w;
            bottom *= ratio;
            top *= ratio;
        }

        Ok(Self {
            left,
            right,
            bottom,
            top,
            near: config.near,
            far: config.far,
        })
    }

    pub fn matrix(&self) -> Matrix4 {
        frustum(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }

    /// Horizontal and vertical scale relative to the base half extent.
    pub fn scale(&self, config: FrustumConfig) -> (f32, f32) {
        (
            self.right / config.half_extent,
            self.top / config.half_extent,
        )
    }
}
