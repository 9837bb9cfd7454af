//! Shared image artifact types.
//!
//! [`SourceImage`] is what a file picker hands over; [`NormalizedImage`] is
//! what the upload step consumes. Both are plain owned data with no
//! back-references, so they move freely across rayon workers.

use image::ImageFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// MIME type of every normalized output.
pub const JPEG_MIME: &str = "image/jpeg";

/// An input photo: raw bytes plus what the caller claims about them.
///
/// The declared MIME type is informational; decoding sniffs the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub data: Vec<u8>,
    pub mime_type: String,
    /// Original file name, used only to derive the output name.
    pub name: String,
}

impl SourceImage {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Read a file from disk, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            data,
            mime_type: mime_for_path(path).to_string(),
            name,
        })
    }
}

/// A file that could not be read into a [`SourceImage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Read every file, in order. Unreadable files are logged and returned
/// separately so callers can report them next to decode failures.
pub fn read_sources(paths: &[PathBuf]) -> (Vec<SourceImage>, Vec<ReadFailure>) {
    let mut sources = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        match SourceImage::from_path(path) {
            Ok(source) => sources.push(source),
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot read file");
                failures.push(ReadFailure {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    (sources, failures)
}

/// Best-effort MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// A re-encoded, width-bounded JPEG ready for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedImage {
    #[serde(skip)]
    pub data: Vec<u8>,
    pub mime_type: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl NormalizedImage {
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
