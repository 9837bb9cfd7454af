//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (header-only dimension read) and render (decode,
//! resample, re-encode as JPEG).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, no system
//! codecs. Everything works on in-memory buffers; backends never touch disk.

use super::params::RenderParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers in
/// [`normalize_batch`](crate::normalize::normalize_batch).
pub trait ImageBackend: Sync {
    /// Read intrinsic pixel dimensions.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, resample to exactly `width`×`height`, and encode as JPEG.
    fn render(&self, params: &RenderParams) -> Result<Vec<u8>, BackendError>;
}
