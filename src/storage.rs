//! Object storage seam for normalized uploads.
//!
//! The app talks to a hosted object store: upsert bytes under a key, then ask
//! for a public URL. [`ObjectStore`] captures exactly those two calls so the
//! upload pipeline receives its store by injection instead of reaching for a
//! process-wide client.
//!
//! [`LocalStore`] is the directory-backed implementation used by the CLI and
//! in tests. It lays objects out as `<root>/<bucket>/<key>` and builds URLs as
//! `<public_base_url>/<bucket>/<key>`, which mirrors the hosted layout closely
//! enough that swapping in a network store changes no caller.

use crate::types::NormalizedImage;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A bucketed key/value blob store with public URLs.
pub trait ObjectStore: Sync {
    /// Store `image` under `key`, replacing any existing object.
    fn put(&self, key: &str, image: &NormalizedImage) -> Result<(), StorageError>;

    /// Publicly resolvable URL for `key`.
    fn public_url(&self, key: &str) -> Result<String, StorageError>;
}

/// Reject keys that could escape the bucket or address nothing.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = || StorageError::InvalidKey(key.to_string());
    if key.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(invalid());
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(invalid());
    }
    // Catches drive prefixes and anything else the platform treats specially
    if !Path::new(key)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(invalid());
    }
    Ok(())
}

/// Directory-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalStore {
    pub fn new(
        root: impl Into<PathBuf>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Filesystem path an object with `key` lives at.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(&self.bucket).join(key))
    }
}

impl ObjectStore for LocalStore {
    fn put(&self, key: &str, image: &NormalizedImage) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &image.data)?;
        debug!(key, bytes = image.data.len(), path = %path.display(), "stored object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<String, StorageError> {
        validate_key(key)?;
        Ok(format!("{}/{}/{}", self.public_base_url, self.bucket, key))
    }
}
