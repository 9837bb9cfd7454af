//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary and works on in-memory
//! buffers.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageDecoder::dimensions` + EXIF orientation (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate, format sniffed from magic bytes |
//! | Orient | `image::DynamicImage::apply_orientation` from the EXIF Orientation tag |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::RenderParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;
use tracing::debug;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a buffer in a reader with the format sniffed from its contents.
///
/// The declared MIME type is never trusted: browsers hand over whatever the
/// file picker reported, so the bytes decide.
fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(format!("Failed to sniff format: {e}")))
}

fn decoder(data: &[u8]) -> Result<impl ImageDecoder + '_, BackendError> {
    let reader = reader(data)?;
    if reader.format().is_none() {
        return Err(BackendError::Decode("unrecognized image format".into()));
    }
    reader
        .into_decoder()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// EXIF orientation of the stored pixels. A missing or unreadable tag means
/// the pixels are already upright.
fn orientation(decoder: &mut impl ImageDecoder) -> Orientation {
    match decoder.orientation() {
        Ok(orientation) => orientation,
        Err(e) => {
            debug!(error = %e, "ignoring unreadable orientation");
            Orientation::NoTransforms
        }
    }
}

/// Dimensions as displayed: width and height swap for quarter turns.
fn oriented_dimensions((width, height): (u32, u32), orientation: Orientation) -> Dimensions {
    match orientation {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => Dimensions {
            width: height,
            height: width,
        },
        _ => Dimensions { width, height },
    }
}

/// Decode to upright pixels. The output JPEG carries no EXIF, so the
/// rotation has to be baked in.
fn decode(data: &[u8]) -> Result<DynamicImage, BackendError> {
    let mut decoder = decoder(data)?;
    let orientation = orientation(&mut decoder);
    let mut img =
        DynamicImage::from_decoder(decoder).map_err(|e| BackendError::Decode(e.to_string()))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Encode as baseline JPEG. Alpha is discarded; JPEG has no alpha channel.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let mut decoder = decoder(data)?;
        let orientation = orientation(&mut decoder);
        Ok(oriented_dimensions(decoder.dimensions(), orientation))
    }

    fn render(&self, params: &RenderParams) -> Result<Vec<u8>, BackendError> {
        let img = decode(params.source)?;
        let resized = if img.width() == params.width && img.height() == params.height {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        encode_jpeg(&resized, params.quality.to_jpeg_quality())
    }
}
