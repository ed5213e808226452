/// Convenience result alias used across the crate.
pub type WatermarkResult<T> = Result<T, WatermarkError>;

/// Error type for every fallible operation in the watermark pipeline.
///
/// All variants are local and recoverable; nothing here is fatal to the hosting process.
#[derive(thiserror::Error, Debug)]
pub enum WatermarkError {
    /// The uploaded source bytes could not be decoded into a raster image.
    #[error("decode error: {0}")]
    Decode(String),

    /// No usable font face could be resolved for the watermark text.
    #[error("font error: {0}")]
    Font(String),

    /// The composite could not be rasterized (e.g. the source exceeds rasterizer limits).
    #[error("render error: {0}")]
    Render(String),

    /// A composite surface could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// Encoding was requested for a surface that was never sized by a render.
    #[error("empty surface: render an image before encoding")]
    EmptySurface,

    /// An operation needed a source image but none has been provided yet.
    #[error("no source image has been provided")]
    NoImage,

    /// Invalid options passed by the host.
    #[error("validation error: {0}")]
    Validation(String),

    /// Anything else, with context preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WatermarkError {
    /// Build a [`WatermarkError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`WatermarkError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`WatermarkError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`WatermarkError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`WatermarkError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
