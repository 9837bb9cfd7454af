//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`normalize`](crate::normalize) (which decides the
//! output size and name) and the [`backend`](super::backend) (which does the
//! actual pixel work). This separation allows swapping backends (e.g. for
//! testing with a mock) without changing the normalization logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality as a fraction in `(0, 1]`, default 0.7.
//! - [`CompressionOptions`] — Per-call settings: quality, width bound, output extension.
//! - [`RenderParams`] — Full specification for one re-encode: source bytes, target size, quality.

/// Quality setting for lossy JPEG encoding, expressed as a fraction in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(pub f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// True when the fraction lies in `(0, 1]`.
    pub fn is_valid(self) -> bool {
        self.0 > 0.0 && self.0 <= 1.0
    }

    /// Map to the 1–100 scale the JPEG encoder expects.
    pub fn to_jpeg_quality(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.7)
    }
}

/// Settings for a single normalization call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOptions {
    pub quality: Quality,
    /// Upper bound on output width in pixels.
    pub max_width: u32,
    /// Extension appended to the derived output name (without the dot).
    pub extension: String,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            max_width: 800,
            extension: "jpg".to_string(),
        }
    }
}

impl CompressionOptions {
    /// Check every field is within range; returns a message naming the first bad one.
    pub fn check(&self) -> Result<(), String> {
        if !self.quality.is_valid() {
            return Err(format!(
                "quality must be in (0, 1], got {}",
                self.quality.value()
            ));
        }
        if self.max_width == 0 {
            return Err("max_width must be positive".into());
        }
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(format!(
                "extension must be a bare suffix like \"jpg\", got {:?}",
                self.extension
            ));
        }
        Ok(())
    }
}

/// Parameters for a resample + JPEG re-encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams<'a> {
    pub source: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
