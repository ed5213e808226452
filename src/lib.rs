//! Watermarker composites a text watermark over a raster image and exports the result as PNG.
//!
//! The API mirrors an interactive editor:
//!
//! - Hold parameters and the uploaded image in a [`ConfigStore`]
//! - Let a [`PreviewSession`] re-render on every change, newest request wins
//! - Export the current composite at native resolution with [`PreviewSession::export`]
//!
//! [`Watermarker`] bundles the store and the session. For one-off renders use a [`Compositor`]
//! directly.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Export encoding.
pub mod encode;
/// CPU compositing.
pub mod render;
/// Watermark parameters and the observable store.
pub mod scene;
/// Live preview session.
pub mod session;

pub use crate::foundation::core::{Affine, Canvas, Point, Vec2};
pub use crate::foundation::error::{WatermarkError, WatermarkResult};

pub use crate::assets::decode::{SourceImage, decode_image};
pub use crate::assets::font::{FONT_ENV_VAR, FontSource};
pub use crate::assets::source::SourceImageRef;
pub use crate::encode::png::{EXPORT_FILE_NAME, ExportArtifact, encode_png};
pub use crate::render::compositor::{
    Compositor, CompositorOpts, anchor_point, watermark_transform,
};
pub use crate::render::surface::CompositeSurface;
pub use crate::scene::config::{
    DrawParams, FONT_SIZE_RANGE, LEFT_RANGE, OPACITY_RANGE, TOP_RANGE, WATERMARK_ANGLE,
    WatermarkConfig,
};
pub use crate::scene::store::{ConfigStore, SnapshotObserver, WatermarkSnapshot};
pub use crate::session::preview::{
    PreviewSession, PreviewSessionOpts, RenderOutcome, RequestStatus, Watermarker,
};
