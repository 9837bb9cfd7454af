//! Output file names and object-store keys.
//!
//! Two naming concerns live here:
//!
//! - **File names**: a normalized image keeps its source's base name with the
//!   extension swapped (`IMG_0042.HEIC.png` → `IMG_0042.HEIC.jpg`).
//! - **Storage keys**: uploads are stored under the owner's id, always with a
//!   `.jpg` suffix, e.g. `5f1c…/avatar.jpg` or `5f1c…/gallery/9b0e4d2a7c1f3e88.jpg`.
//!
//! Gallery keys are content-addressed: the id is a SHA-256 prefix of the
//! normalized bytes, so re-uploading the same photo overwrites rather than
//! duplicates.

use sha2::{Digest, Sha256};

/// Base name used when the source name has nothing left after stripping.
const FALLBACK_STEM: &str = "image";

/// Hex characters of the content hash kept in gallery keys.
const GALLERY_ID_LEN: usize = 16;

/// Suffix every storage key carries.
const KEY_SUFFIX: &str = ".jpg";

/// Derive an output file name from a source name and a target extension.
///
/// - `"beach.png"`, `"jpg"` → `"beach.jpg"`
/// - `"archive.tar.gz"`, `"jpg"` → `"archive.tar.jpg"` (only the last extension goes)
/// - `"scan"`, `"jpg"` → `"scan.jpg"`
/// - `".hidden"`, `"jpg"` → `"image.jpg"`
/// - `"photos/trip/beach.webp"`, `"jpeg"` → `"beach.jpeg"`
pub fn derive_file_name(source_name: &str, extension: &str) -> String {
    let base = source_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_name);
    let stem = match base.rfind('.') {
        Some(pos) => &base[..pos],
        None => base,
    };
    let stem = if stem.trim().is_empty() {
        FALLBACK_STEM
    } else {
        stem
    };
    format!("{stem}.{extension}")
}

/// Normalize a caller-supplied storage path into a key ending in `.jpg`.
///
/// Leading slashes are dropped so keys are always bucket-relative.
pub fn storage_key(path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.ends_with(KEY_SUFFIX) {
        path.to_string()
    } else {
        format!("{path}{KEY_SUFFIX}")
    }
}

/// Key for an owner's avatar.
pub fn avatar_key(owner: &str) -> String {
    storage_key(&format!("{owner}/avatar"))
}

/// Content-addressed key for a gallery photo.
pub fn gallery_key(owner: &str, data: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(data));
    storage_key(&format!("{owner}/gallery/{}", &digest[..GALLERY_ID_LEN]))
}
