//! Export encoding.

/// PNG encoding of composited surfaces and the download artifact.
pub mod png;
