#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use watermarker::{Compositor, CompositorOpts, FontSource, SourceImage, WatermarkConfig};

/// PNG bytes of a `width` x `height` image whose pixels come from `f(x, y)`.
pub fn png_bytes(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| image::Rgba(f(x, y)));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

pub fn checker(x: u32, y: u32) -> [u8; 4] {
    if (x / 8 + y / 8) % 2 == 0 {
        [20, 40, 60, 255]
    } else {
        [90, 30, 10, 255]
    }
}

/// Font usable for rasterizing tests: `WATERMARK_TEST_FONT` if set, else whatever the system
/// lookup finds. `None` means glyph tests should be skipped.
pub fn test_font() -> Option<FontSource> {
    let font = match std::env::var_os("WATERMARK_TEST_FONT") {
        Some(path) => FontSource::File(PathBuf::from(path)),
        None => FontSource::default(),
    };
    let probe = SourceImage::from_rgba8(8, 8, vec![0; 8 * 8 * 4]).unwrap();
    let mut compositor = Compositor::new(CompositorOpts::default().with_font(font.clone()));
    compositor
        .render(Some(&probe), &WatermarkConfig::with_text("probe"))
        .ok()
        .map(|_| font)
}

pub fn missing_font() -> FontSource {
    FontSource::File(PathBuf::from("/nonexistent/watermark-font.ttf"))
}

/// Route library logs through the test harness's captured output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
