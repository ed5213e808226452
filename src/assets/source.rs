use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::assets::decode::{SourceImage, decode_image};
use crate::foundation::error::WatermarkResult;

/// Handle to an uploaded, still-encoded source image.
///
/// This is what the configuration store holds: decoding is deferred to the preview session so it
/// can run off the caller's thread. Two handles with the same bytes share a fingerprint, which is
/// the decode cache key.
#[derive(Clone, Debug)]
pub struct SourceImageRef {
    bytes: Arc<[u8]>,
    fingerprint: u64,
    name: Option<String>,
}

impl SourceImageRef {
    /// Wrap encoded image bytes.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let fingerprint = xxhash_rust::xxh3::xxh3_64(&bytes);
        Self {
            bytes,
            fingerprint,
            name: None,
        }
    }

    /// Read an image file chosen by the user. Only I/O happens here; decoding is deferred.
    pub fn from_path(path: impl AsRef<Path>) -> WatermarkResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read source image '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self {
            name,
            ..Self::from_bytes(bytes)
        })
    }

    /// Attach a display name (typically the uploaded file name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Encoded bytes as uploaded.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content hash of the encoded bytes.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Display name, if one was provided.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Decode synchronously on the calling thread.
    pub fn decode(&self) -> WatermarkResult<SourceImage> {
        decode_image(&self.bytes)
    }
}

impl PartialEq for SourceImageRef {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.bytes == other.bytes
    }
}

impl Eq for SourceImageRef {}
