//! # tayo-photos
//!
//! Profile photo preparation for the date-tayo app. Phones hand over
//! multi-megabyte photos in whatever format the camera chose; the app wants
//! small, uniform JPEGs in object storage. This crate sits in between.
//!
//! # Pipeline
//!
//! ```text
//! SourceImage ──normalize──► NormalizedImage ──upload──► ObjectStore ──► public URL
//!   (any format)    width ≤ max_width, JPEG      key: {owner}/...
//! ```
//!
//! Normalization is a pure function of its input bytes and
//! [`CompressionOptions`](imaging::CompressionOptions): no I/O, no shared
//! state, safe to run on every core at once. Uploading is a thin layer that
//! derives a storage key, hands the bytes to an injected store, and returns
//! the store's public URL.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension math, parameters, [`ImageBackend`](imaging::ImageBackend) trait, pure-Rust backend |
//! | [`normalize`] | `normalize` / `normalize_batch` with per-item failure isolation |
//! | [`types`] | [`SourceImage`](types::SourceImage) and [`NormalizedImage`](types::NormalizedImage) |
//! | [`naming`] | Output file names and storage keys |
//! | [`storage`] | [`ObjectStore`](storage::ObjectStore) trait and the directory-backed [`LocalStore`](storage::LocalStore) |
//! | [`upload`] | [`Uploader`](upload::Uploader): avatar and gallery uploads |
//! | [`config`] | `tayo.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Never Upscale
//!
//! The scale factor is `min(1, max_width / width)`. A 400px-wide photo stays
//! 400px wide; stretching it would add bytes and blur without adding detail.
//! Height follows from the same factor, so aspect ratio is preserved to
//! within one pixel of rounding.
//!
//! ## Bytes Decide the Format
//!
//! The MIME type a file picker reports is carried along but not trusted.
//! Decoding sniffs magic bytes, so a PNG named `photo.jpg` still works and a
//! text file named `photo.jpg` fails cleanly with a decode error.
//!
//! ## Best-Effort Batches
//!
//! Selecting ten photos and having one be corrupt should upload nine. Batch
//! operations return every success alongside a list of failures rather than
//! stopping at the first error.
//!
//! ## Injected Storage
//!
//! [`Uploader`](upload::Uploader) borrows its store. Tests use an in-memory
//! store, the CLI a local directory, and a hosted bucket client only has to
//! implement two methods.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod normalize;
pub mod output;
pub mod storage;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
