//! CPU watermark compositing.
//!
//! The compositor copies the decoded source into a fresh [`surface::CompositeSurface`], rasterizes
//! the watermark text into a transparent layer with `vello_cpu`, then blends that layer over the
//! copy at the configured opacity.

pub(crate) mod blend;
/// Text rasterization and source-over compositing.
pub mod compositor;
/// Premultiplied RGBA8 output buffers.
pub mod surface;
