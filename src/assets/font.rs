use std::path::PathBuf;
use std::sync::Arc;

use usvg::fontdb::{Database, Family, Query};

use crate::foundation::error::{WatermarkError, WatermarkResult};

/// Environment variable naming a font file that overrides system font lookup.
pub const FONT_ENV_VAR: &str = "WATERMARK_FONT";

/// Families tried, in order, after the requested ones when resolving a system font.
const SANS_FALLBACKS: &[&str] = &[
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "FreeSans",
];

/// Where the watermark face comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// Raw TrueType/OpenType bytes supplied by the host.
    Bytes(Arc<Vec<u8>>),
    /// A font file on disk.
    File(PathBuf),
    /// Installed system fonts, first matching family wins.
    System(Vec<String>),
}

impl Default for FontSource {
    fn default() -> Self {
        Self::System(vec!["Arial".to_string()])
    }
}

impl FontSource {
    /// [`FontSource::File`] from `WATERMARK_FONT` when set, otherwise the default system lookup.
    pub fn from_env() -> Self {
        std::env::var_os(FONT_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(|v| Self::File(PathBuf::from(v)))
            .unwrap_or_default()
    }

    /// Load the face bytes this source points at.
    pub(crate) fn load(&self) -> WatermarkResult<LoadedFont> {
        match self {
            Self::Bytes(bytes) => Ok(LoadedFont {
                bytes: bytes.clone(),
                index: 0,
                description: "in-memory font".to_string(),
            }),
            Self::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    WatermarkError::font(format!("failed to read font '{}': {e}", path.display()))
                })?;
                Ok(LoadedFont {
                    bytes: Arc::new(bytes),
                    index: 0,
                    description: path.display().to_string(),
                })
            }
            Self::System(families) => load_system_font(families),
        }
    }
}

/// Font bytes ready to hand to the text layout engine and rasterizer.
#[derive(Clone, Debug)]
pub(crate) struct LoadedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub(crate) index: u32,
    pub(crate) description: String,
}

fn load_system_font(families: &[String]) -> WatermarkResult<LoadedFont> {
    let mut db = Database::new();
    db.load_system_fonts();

    let mut wanted: Vec<Family<'_>> = families
        .iter()
        .map(|f| Family::Name(f.as_str()))
        .collect();
    wanted.extend(SANS_FALLBACKS.iter().map(|f| Family::Name(*f)));
    wanted.push(Family::SansSerif);

    let query = Query {
        families: &wanted,
        ..Query::default()
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|face| face.id))
        .ok_or_else(|| WatermarkError::font("no system fonts are installed"))?;

    let description = db
        .face(id)
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| "system font".to_string());
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| {
            WatermarkError::font(format!("failed to read face data for '{description}'"))
        })?;

    tracing::debug!(family = %description, "resolved system font");
    Ok(LoadedFont {
        bytes: Arc::new(bytes),
        index,
        description,
    })
}
