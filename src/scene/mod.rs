//! Watermark parameters and their observable store.

/// Parameter struct, slider domains and render-time sanitization.
pub mod config;
/// Revisioned store notifying a single observer on every change.
pub mod store;
