//! Profile photo upload: normalize, key, store, resolve URL.
//!
//! An [`Uploader`] is built from an image backend, an [`ObjectStore`], and
//! the [`CompressionOptions`] to apply. Nothing here reaches for a global
//! client; whoever constructs the uploader decides where bytes go.
//!
//! ## Keys
//!
//! | Upload | Key |
//! |---|---|
//! | Arbitrary | caller path, `.jpg` appended if missing |
//! | Avatar | `{owner}/avatar.jpg` |
//! | Gallery | `{owner}/gallery/{sha256 prefix}.jpg` |
//!
//! Gallery uploads are best-effort like [`normalize_batch`](crate::normalize::normalize_batch):
//! each photo that fails to normalize or store is reported and the rest go
//! through. Because gallery keys are content-addressed, selecting the same
//! photo twice stores it once; the repeat is reported as a duplicate.

use crate::imaging::{CompressionOptions, ImageBackend};
use crate::naming::{avatar_key, gallery_key, storage_key};
use crate::normalize::{NormalizeError, normalize_batch_with_backend, normalize_with_backend};
use crate::storage::{ObjectStore, StorageError};
use crate::types::{NormalizedImage, SourceImage};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A stored photo and where to find it.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedImage {
    pub key: String,
    pub url: String,
    #[serde(flatten)]
    pub image: NormalizedImage,
}

/// A gallery photo that did not make it into storage.
#[derive(Debug)]
pub struct UploadFailure {
    pub name: String,
    pub error: UploadError,
}

/// A gallery photo whose normalized bytes matched an earlier one in the same call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePhoto {
    pub name: String,
    /// Key the first copy was stored under.
    pub key: String,
}

/// Result of a gallery upload.
#[derive(Debug, Default)]
pub struct GalleryOutcome {
    /// Stored photos, in selection order.
    pub uploaded: Vec<UploadedImage>,
    pub failures: Vec<UploadFailure>,
    pub duplicates: Vec<DuplicatePhoto>,
}

pub struct Uploader<'a, B: ImageBackend, S: ObjectStore> {
    backend: &'a B,
    store: &'a S,
    options: CompressionOptions,
}

impl<'a, B: ImageBackend, S: ObjectStore> Uploader<'a, B, S> {
    pub fn new(backend: &'a B, store: &'a S, options: CompressionOptions) -> Self {
        Self {
            backend,
            store,
            options,
        }
    }

    /// Normalize `source` and store it at `path` (`.jpg` appended if missing).
    pub fn upload_image(
        &self,
        source: &SourceImage,
        path: &str,
    ) -> Result<UploadedImage, UploadError> {
        let image = normalize_with_backend(self.backend, source, &self.options)?;
        self.store_normalized(storage_key(path), image)
    }

    /// Replace `owner`'s avatar.
    pub fn upload_avatar(
        &self,
        owner: &str,
        source: &SourceImage,
    ) -> Result<UploadedImage, UploadError> {
        let image = normalize_with_backend(self.backend, source, &self.options)?;
        self.store_normalized(avatar_key(owner), image)
    }

    /// Add photos to `owner`'s gallery, skipping any that fail.
    ///
    /// Keys are derived from the normalized bytes, so identical photos share
    /// one object. Repeats within a call are not stored again and land in
    /// [`GalleryOutcome::duplicates`]; a photo already in the bucket from an
    /// earlier call is overwritten in place.
    ///
    /// Invalid compression options are the only whole-call error.
    pub fn upload_gallery(
        &self,
        owner: &str,
        sources: &[SourceImage],
    ) -> Result<GalleryOutcome, UploadError> {
        let batch = normalize_batch_with_backend(self.backend, sources, &self.options)?;

        let mut outcome = GalleryOutcome {
            uploaded: Vec::with_capacity(batch.images.len()),
            failures: batch
                .failures
                .into_iter()
                .map(|f| UploadFailure {
                    name: f.name,
                    error: f.error.into(),
                })
                .collect(),
            duplicates: Vec::new(),
        };

        let mut seen = HashSet::new();
        for image in batch.images {
            let key = gallery_key(owner, &image.data);
            if !seen.insert(key.clone()) {
                info!(owner, name = %image.name, %key, "skipping duplicate gallery photo");
                outcome.duplicates.push(DuplicatePhoto {
                    name: image.name,
                    key,
                });
                continue;
            }
            let name = image.name.clone();
            match self.store_normalized(key, image) {
                Ok(uploaded) => outcome.uploaded.push(uploaded),
                Err(error) => {
                    warn!(owner, name = %name, %error, "gallery upload failed");
                    outcome.failures.push(UploadFailure { name, error });
                }
            }
        }

        info!(
            owner,
            uploaded = outcome.uploaded.len(),
            failed = outcome.failures.len(),
            duplicates = outcome.duplicates.len(),
            "gallery upload complete"
        );
        Ok(outcome)
    }

    fn store_normalized(
        &self,
        key: String,
        image: NormalizedImage,
    ) -> Result<UploadedImage, UploadError> {
        self.store.put(&key, &image)?;
        let url = self.store.public_url(&key)?;
        Ok(UploadedImage { key, url, image })
    }
}
