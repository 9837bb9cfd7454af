//! Pre-upload image normalization.
//!
//! Turns an arbitrary photo into a width-bounded JPEG:
//!
//! ```text
//! SourceImage ──identify──► (w, h) ──scale──► (w', h') ──render──► NormalizedImage
//!                                 min(1, max_width / w)     Lanczos3 + JPEG
//! ```
//!
//! Every call is independent and stateless. [`normalize_batch`] fans items
//! out on the rayon pool and isolates failures per item: one corrupt upload
//! never costs the user the rest of the selection.

use crate::imaging::{
    BackendError, CompressionOptions, ImageBackend, RenderParams, RustBackend,
    calculate_bounded_dimensions,
};
use crate::naming::derive_file_name;
use crate::types::{JPEG_MIME, NormalizedImage, SourceImage};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("cannot decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("cannot encode {name}: {reason}")]
    Encode { name: String, reason: String },
    #[error("invalid compression options: {0}")]
    InvalidOptions(String),
}

impl NormalizeError {
    fn from_backend(name: &str, err: BackendError) -> Self {
        match err {
            BackendError::Decode(reason) => Self::Decode {
                name: name.to_string(),
                reason,
            },
            BackendError::Encode(reason) => Self::Encode {
                name: name.to_string(),
                reason,
            },
        }
    }

    /// Short machine-friendly label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::InvalidOptions(_) => "options",
        }
    }
}

/// One item that could not be normalized.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position in the input sequence.
    pub index: usize,
    pub name: String,
    pub error: NormalizeError,
}

/// Result of a best-effort batch: every success plus every failure.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful outputs in input order.
    pub images: Vec<NormalizedImage>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Normalize one image with the pure-Rust backend.
pub fn normalize(
    source: &SourceImage,
    options: &CompressionOptions,
) -> Result<NormalizedImage, NormalizeError> {
    normalize_with_backend(&RustBackend::new(), source, options)
}

/// Normalize one image using a specific backend (allows testing with mock).
pub fn normalize_with_backend(
    backend: &impl ImageBackend,
    source: &SourceImage,
    options: &CompressionOptions,
) -> Result<NormalizedImage, NormalizeError> {
    options.check().map_err(NormalizeError::InvalidOptions)?;
    normalize_checked(backend, source, options)
}

fn normalize_checked(
    backend: &impl ImageBackend,
    source: &SourceImage,
    options: &CompressionOptions,
) -> Result<NormalizedImage, NormalizeError> {
    let dims = backend
        .identify(&source.data)
        .map_err(|e| NormalizeError::from_backend(&source.name, e))?;
    if dims.width == 0 || dims.height == 0 {
        return Err(NormalizeError::Decode {
            name: source.name.clone(),
            reason: format!("zero-sized image ({}x{})", dims.width, dims.height),
        });
    }

    let (width, height) =
        calculate_bounded_dimensions((dims.width, dims.height), options.max_width);
    debug!(
        name = %source.name,
        from = %format!("{}x{}", dims.width, dims.height),
        to = %format!("{width}x{height}"),
        "normalizing"
    );

    let data = backend
        .render(&RenderParams {
            source: &source.data,
            width,
            height,
            quality: options.quality,
        })
        .map_err(|e| NormalizeError::from_backend(&source.name, e))?;
    if data.is_empty() {
        return Err(NormalizeError::Encode {
            name: source.name.clone(),
            reason: "encoder produced no output".into(),
        });
    }

    Ok(NormalizedImage {
        data,
        mime_type: JPEG_MIME.to_string(),
        name: derive_file_name(&source.name, &options.extension),
        width,
        height,
    })
}

/// Normalize many images with the pure-Rust backend.
///
/// See [`normalize_batch_with_backend`].
pub fn normalize_batch(
    sources: &[SourceImage],
    options: &CompressionOptions,
) -> Result<BatchOutcome, NormalizeError> {
    normalize_batch_with_backend(&RustBackend::new(), sources, options)
}

/// Normalize many images in parallel, collecting per-item failures.
///
/// Only invalid `options` fail the call as a whole; they would fail every
/// item identically. Successes keep their relative input order.
pub fn normalize_batch_with_backend(
    backend: &impl ImageBackend,
    sources: &[SourceImage],
    options: &CompressionOptions,
) -> Result<BatchOutcome, NormalizeError> {
    options.check().map_err(NormalizeError::InvalidOptions)?;

    let results: Vec<Result<NormalizedImage, NormalizeError>> = sources
        .par_iter()
        .map(|source| normalize_checked(backend, source, options))
        .collect();

    let mut outcome = BatchOutcome::default();
    for (index, (source, result)) in sources.iter().zip(results).enumerate() {
        match result {
            Ok(image) => outcome.images.push(image),
            Err(error) => {
                warn!(index, name = %source.name, %error, "skipping image");
                outcome.failures.push(BatchFailure {
                    index,
                    name: source.name.clone(),
                    error,
                });
            }
        }
    }

    info!(
        normalized = outcome.images.len(),
        failed = outcome.failures.len(),
        "batch complete"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::imaging::backend::tests::{CORRUPT, MockBackend, RecordedOp};
    use crate::imaging::Dimensions;
    use crate::test_helpers::{jpeg_bytes, png_bytes, with_exif_orientation};

    fn source(data: &[u8], name: &str) -> SourceImage {
        SourceImage::new(data.to_vec(), "image/jpeg", name)
    }

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // normalize with mock backend
    // =========================================================================

    #[test]
    fn large_image_is_bounded() {
        let backend = MockBackend::with_dimensions(vec![(b"big", dims(1600, 1200))]);
        let out = normalize_with_backend(
            &backend,
            &source(b"big", "big.png"),
            &CompressionOptions::default(),
        )
        .unwrap();

        assert_eq!((out.width, out.height), (800, 600));
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(out.name, "big.jpg");

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], RecordedOp::Identify(3)));
        assert!(matches!(
            ops[1],
            RecordedOp::Render {
                width: 800,
                height: 600,
                quality: 70,
                ..
            }
        ));
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let backend = MockBackend::with_dimensions(vec![(b"small", dims(400, 300))]);
        let out = normalize_with_backend(
            &backend,
            &source(b"small", "small.jpg"),
            &CompressionOptions::default(),
        )
        .unwrap();
        assert_eq!((out.width, out.height), (400, 300));
    }

    #[test]
    fn custom_extension_and_quality_flow_through() {
        let backend = MockBackend::with_dimensions(vec![(b"x", dims(100, 100))]);
        let options = CompressionOptions {
            quality: Quality::new(0.25),
            max_width: 50,
            extension: "jpeg".into(),
        };
        let out = normalize_with_backend(&backend, &source(b"x", "x.webp"), &options).unwrap();
        assert_eq!(out.name, "x.jpeg");
        assert_eq!((out.width, out.height), (50, 50));
        assert!(matches!(
            backend.get_operations()[1],
            RecordedOp::Render { quality: 25, .. }
        ));
    }

    #[test]
    fn corrupt_input_is_decode_error() {
        let backend = MockBackend::new();
        let err = normalize_with_backend(
            &backend,
            &source(CORRUPT, "notes.txt"),
            &CompressionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizeError::Decode { ref name, .. } if name == "notes.txt"));
        assert_eq!(err.kind(), "decode");
        // Never reached the encoder
        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn zero_sized_image_is_decode_error() {
        let backend = MockBackend::with_dimensions(vec![(b"z", dims(0, 10))]);
        let err = normalize_with_backend(
            &backend,
            &source(b"z", "z.png"),
            &CompressionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizeError::Decode { .. }));
    }

    #[test]
    fn empty_encoder_output_is_encode_error() {
        let backend = MockBackend::with_empty_output(vec![(b"e", dims(10, 10))]);
        let err = normalize_with_backend(
            &backend,
            &source(b"e", "e.png"),
            &CompressionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizeError::Encode { .. }));
        assert_eq!(err.kind(), "encode");
    }

    #[test]
    fn invalid_options_rejected_before_backend() {
        let backend = MockBackend::new();
        let options = CompressionOptions {
            quality: Quality::new(0.0),
            ..Default::default()
        };
        let err = normalize_with_backend(&backend, &source(b"a", "a.jpg"), &options).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidOptions(_)));
        assert!(backend.get_operations().is_empty());
    }

    // =========================================================================
    // normalize_batch with mock backend
    // =========================================================================

    #[test]
    fn batch_isolates_corrupt_item() {
        let backend = MockBackend::with_dimensions(vec![
            (&b"a"[..], dims(2000, 1000)),
            (&b"c"[..], dims(300, 300)),
        ]);
        let sources = vec![
            source(b"a", "a.png"),
            source(CORRUPT, "b.png"),
            source(b"c", "c.png"),
        ];

        let outcome =
            normalize_batch_with_backend(&backend, &sources, &CompressionOptions::default())
                .unwrap();

        assert_eq!(outcome.images.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].name, "b.png");
        let names: Vec<&str> = outcome.images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
        assert_eq!((outcome.images[0].width, outcome.images[0].height), (800, 400));
    }

    #[test]
    fn batch_empty_input() {
        let backend = MockBackend::new();
        let outcome =
            normalize_batch_with_backend(&backend, &[], &CompressionOptions::default()).unwrap();
        assert!(outcome.images.is_empty());
        assert!(outcome.is_complete());
    }

    #[test]
    fn batch_invalid_options_fail_whole_call() {
        let backend = MockBackend::new();
        let options = CompressionOptions {
            max_width: 0,
            ..Default::default()
        };
        let result = normalize_batch_with_backend(&backend, &[source(b"a", "a.jpg")], &options);
        assert!(matches!(result, Err(NormalizeError::InvalidOptions(_))));
    }

    // =========================================================================
    // normalize with the real backend
    // =========================================================================

    #[test]
    fn png_in_jpeg_out() {
        let src = SourceImage::new(png_bytes(120, 80), "image/png", "avatar.png");
        let out = normalize(&src, &CompressionOptions::default()).unwrap();
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(out.name, "avatar.jpg");
        assert_eq!(
            image::guess_format(&out.data).unwrap(),
            image::ImageFormat::Jpeg
        );
        assert_eq!((out.width, out.height), (120, 80));
    }

    #[test]
    fn renormalizing_output_keeps_dimensions() {
        let src = SourceImage::new(jpeg_bytes(1000, 750), "image/jpeg", "shot.jpg");
        let options = CompressionOptions::default();
        let first = normalize(&src, &options).unwrap();
        assert_eq!((first.width, first.height), (800, 600));

        let again = SourceImage::new(
            first.data.clone(),
            first.mime_type.clone(),
            first.name.clone(),
        );
        let second = normalize(&again, &options).unwrap();
        assert_eq!((second.width, second.height), (first.width, first.height));
        assert_eq!(second.name, first.name);
    }

    #[test]
    fn rotated_phone_photo_is_bounded_upright() {
        // Sensor 1600x1200 tagged "rotate 90 CW" displays as 1200x1600.
        let data = with_exif_orientation(&jpeg_bytes(1600, 1200), 6);
        let src = SourceImage::new(data, "image/jpeg", "IMG_0042.jpg");
        let out = normalize(&src, &CompressionOptions::default()).unwrap();
        assert_eq!((out.width, out.height), (800, 1067));

        let decoded = image::load_from_memory(&out.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 1067));
    }
}
