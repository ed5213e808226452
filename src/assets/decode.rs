use std::io::Cursor;
use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{WatermarkError, WatermarkResult};

/// Decoded source raster in straight (non-premultiplied) RGBA8, exactly as the file stores it.
///
/// Cloning is cheap; pixel storage is shared and never mutated after decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Build a source from straight (non-premultiplied) row-major RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> WatermarkResult<Self> {
        let canvas = Canvas { width, height };
        if canvas.is_empty() {
            return Err(WatermarkError::decode("image has zero width or height"));
        }
        if rgba8.len() != canvas.rgba8_len() {
            return Err(WatermarkError::decode(format!(
                "rgba8 buffer is {} bytes, expected {} for {width}x{height}",
                rgba8.len(),
                canvas.rgba8_len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Intrinsic dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel bytes in row-major straight RGBA8.
    pub fn rgba8(&self) -> &[u8] {
        self.rgba8.as_slice()
    }
}

/// Decode an encoded raster (PNG, JPEG, ...) and apply its EXIF orientation.
pub fn decode_image(bytes: &[u8]) -> WatermarkResult<SourceImage> {
    if bytes.is_empty() {
        return Err(WatermarkError::decode("source image is empty"));
    }

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| WatermarkError::decode(format!("sniff image format: {e}")))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| WatermarkError::decode(format!("open image decoder: {e}")))?;
    let orientation = image::ImageDecoder::orientation(&mut decoder)
        .map_err(|e| WatermarkError::decode(format!("read image orientation: {e}")))?;
    let mut dyn_img = image::DynamicImage::from_decoder(decoder)
        .map_err(|e| WatermarkError::decode(format!("decode image from memory: {e}")))?;
    dyn_img.apply_orientation(orientation);

    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::from_rgba8(width, height, rgba.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
