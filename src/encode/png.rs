use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{WatermarkError, WatermarkResult};
use crate::render::surface::CompositeSurface;

/// File name offered for the downloaded composite.
pub const EXPORT_FILE_NAME: &str = "watermarked-image.png";

/// Serialize the surface's current pixels as PNG.
///
/// No drawing happens here: the bytes reflect exactly what the last render left in `surface`.
/// Unsized surfaces yield [`WatermarkError::EmptySurface`].
pub fn encode_png(surface: &CompositeSurface) -> WatermarkResult<Vec<u8>> {
    let img = surface.to_rgba_image()?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| WatermarkError::encode(format!("write png: {e}")))?;
    Ok(buf)
}

/// Encoded composite ready to hand to a download/save mechanism.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, always [`EXPORT_FILE_NAME`].
    pub file_name: String,
    /// PNG bytes.
    pub bytes: Vec<u8>,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
}

impl ExportArtifact {
    /// Encode `surface` into an artifact.
    pub fn from_surface(surface: &CompositeSurface) -> WatermarkResult<Self> {
        Ok(Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            bytes: encode_png(surface)?,
            width: surface.width(),
            height: surface.height(),
        })
    }

    /// Write the artifact into `dir` under its file name, creating `dir` if needed.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> WatermarkResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
