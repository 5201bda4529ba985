//! RGBA pixel buffers handed to the analyzers.

use image::{imageops::FilterType, DynamicImage, RgbaImage};

use crate::geometry::FRAME_SIZE_PX;

/// Row-major, non-premultiplied RGBA buffer, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    buffer: RgbaImage,
}

impl PixelFrame {
    /// Wraps raw RGBA bytes. Returns `None` if the length does not match `width × height × 4`.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Wraps an existing RGBA image.
    #[must_use]
    pub const fn from_rgba(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Converts a decoded image at its native resolution.
    #[must_use]
    pub fn native(image: &DynamicImage) -> Self {
        Self::from_rgba(image.to_rgba8())
    }

    /// Draws a decoded image scaled onto the fixed 600×600 processing square.
    ///
    /// Aspect ratio is not preserved, matching a canvas `drawImage` into a square.
    #[must_use]
    pub fn normalized(image: &DynamicImage) -> Self {
        let side = FRAME_SIZE_PX;
        if image.width() == side && image.height() == side {
            return Self::native(image);
        }
        let scaled = image.resize_exact(side, side, FilterType::Triangle);
        Self::from_rgba(scaled.to_rgba8())
    }

    /// Frame width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Frame height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Number of pixels.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.buffer.as_raw().len() / 4
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Iterates over pixels as `[r, g, b, a]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.buffer.pixels().map(|p| p.0)
    }

    /// Pixel at `(x, y)`, if inside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.buffer.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// True iff every pixel's alpha channel is exactly 255.
    ///
    /// Used as the 24-bit color proxy: any transparency fails.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.pixels().all(|[_, _, _, a]| a == u8::MAX)
    }
}
