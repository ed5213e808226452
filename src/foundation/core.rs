pub use kurbo::{Affine, Point, Vec2};

/// Pixel dimensions of a raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes an RGBA8 buffer of this size occupies.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Convert a pair of percentages into a pixel-space point.
    ///
    /// `left_pct` scales the width and `top_pct` the height; `50.0, 50.0` is the center.
    pub fn point_at_percent(self, left_pct: f64, top_pct: f64) -> Point {
        Point::new(
            f64::from(self.width) * left_pct / 100.0,
            f64::from(self.height) * top_pct / 100.0,
        )
    }
}
