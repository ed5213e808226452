use crate::foundation::core::Canvas;
use crate::foundation::error::{WatermarkError, WatermarkResult};

/// Rasterized result of drawing the source image plus the watermark.
///
/// Pixels are row-major straight (non-premultiplied) RGBA8 at the source image's native
/// resolution. A `Default` surface is unsized (0×0) and cannot be encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CompositeSurface {
    /// Fully transparent surface of the given size.
    pub(crate) fn blank(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba8_len()],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// `true` for a surface that no render has sized yet.
    pub fn is_empty(&self) -> bool {
        self.canvas().is_empty()
    }

    /// Pixel bytes in row-major straight RGBA8, as image files store them.
    pub fn rgba8(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn rgba8_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Straight RGBA8 pixel at `(x, y)`, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Owned [`image::RgbaImage`] copy for encoding or display.
    pub fn to_rgba_image(&self) -> WatermarkResult<image::RgbaImage> {
        if self.is_empty() {
            return Err(WatermarkError::EmptySurface);
        }
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| WatermarkError::encode("surface byte length does not match its size"))
    }
}
