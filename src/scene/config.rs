use std::ops::RangeInclusive;

use crate::foundation::error::{WatermarkError, WatermarkResult};

/// Slider domain for [`WatermarkConfig::top`] (percent of image height, step 1).
pub const TOP_RANGE: RangeInclusive<f64> = 2.0..=90.0;
/// Slider domain for [`WatermarkConfig::left`] (percent of image width, step 1).
pub const LEFT_RANGE: RangeInclusive<f64> = 14.0..=90.0;
/// Slider domain for [`WatermarkConfig::font_size`] (pixels, step 1).
pub const FONT_SIZE_RANGE: RangeInclusive<f32> = 10.0..=100.0;
/// Slider domain for [`WatermarkConfig::opacity`] (ratio, step 0.01).
pub const OPACITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Rotation applied about the anchor when [`WatermarkConfig::rotated`] is set (radians, CCW).
pub const WATERMARK_ANGLE: f64 = -std::f64::consts::FRAC_PI_4;

/// Smallest font size the compositor will rasterize.
pub const MIN_FONT_SIZE_PX: f32 = 1.0;
/// Largest font size the compositor will rasterize.
pub const MAX_FONT_SIZE_PX: f32 = 2048.0;

/// Parameters for a single watermark render.
///
/// `top` and `left` are percentages (`0..=100`), while `opacity` is a `0..=1` ratio. The widgets
/// feeding this struct clamp to the `*_RANGE` constants; the compositor still tolerates anything,
/// see [`WatermarkConfig::draw_params`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WatermarkConfig {
    /// Watermark content. Empty text renders nothing.
    pub text: String,
    /// Vertical anchor as percent of the image height.
    pub top: f64,
    /// Horizontal anchor as percent of the image width.
    pub left: f64,
    /// Alpha of the white text fill.
    pub opacity: f32,
    /// Text size in pixels of the image's native resolution.
    pub font_size: f32,
    /// Rotate the text by [`WATERMARK_ANGLE`] about its anchor.
    pub rotated: bool,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            top: 2.0,
            left: 14.0,
            opacity: 0.5,
            font_size: 30.0,
            rotated: true,
        }
    }
}

impl WatermarkConfig {
    /// Default parameters with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON parameter object. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> WatermarkResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| WatermarkError::validation(format!("invalid watermark config: {e}")))
    }

    /// Render-ready view of this config with every numeric field forced into a drawable range.
    ///
    /// - `opacity` is clamped to `[0, 1]`; NaN becomes `0`.
    /// - `font_size` is clamped to `[MIN_FONT_SIZE_PX, MAX_FONT_SIZE_PX]`; NaN becomes the minimum.
    /// - non-finite `top`/`left` become `0`. Finite values outside `0..=100` are kept so a host can
    ///   deliberately place the anchor off-image.
    pub fn draw_params(&self) -> DrawParams<'_> {
        let opacity = if self.opacity.is_nan() {
            0.0
        } else {
            self.opacity.clamp(0.0, 1.0)
        };
        let font_size = if self.font_size.is_nan() {
            MIN_FONT_SIZE_PX
        } else {
            self.font_size.clamp(MIN_FONT_SIZE_PX, MAX_FONT_SIZE_PX)
        };

        DrawParams {
            text: &self.text,
            top_pct: finite_or_zero(self.top),
            left_pct: finite_or_zero(self.left),
            opacity,
            font_size,
            rotated: self.rotated,
        }
    }
}

/// Sanitized parameters consumed by the compositor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams<'a> {
    /// Watermark content.
    pub text: &'a str,
    /// Vertical anchor, percent.
    pub top_pct: f64,
    /// Horizontal anchor, percent.
    pub left_pct: f64,
    /// Fill alpha in `[0, 1]`.
    pub opacity: f32,
    /// Font size in pixels, always positive.
    pub font_size: f32,
    /// Whether to rotate about the anchor.
    pub rotated: bool,
}

impl DrawParams<'_> {
    /// `true` when nothing would be visible: empty text or zero opacity.
    pub fn is_invisible(&self) -> bool {
        self.text.is_empty() || self.opacity <= 0.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
