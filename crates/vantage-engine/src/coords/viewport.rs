/// Drawable surface size in physical pixels.
///
/// Delivered by the host on resize and used to derive the projection's aspect
/// correction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A viewport is renderable only when both dimensions are non-zero.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Returns `true` when the long axis is horizontal.
    #[inline]
    pub fn is_landscape(self) -> bool {
        self.width > self.height
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}
