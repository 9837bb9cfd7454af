//! Tool configuration module.
//!
//! Handles loading, validating, and merging `tayo.toml`. The file is sparse:
//! stock defaults are the base layer and user values override them key by
//! key. Command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! quality = 0.7             # JPEG quality as a fraction in (0, 1]
//! max_width = 800           # Output width bound in pixels (never upscaled)
//! extension = "jpg"         # Extension for derived output names
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [storage]
//! root = "storage"          # Directory the local object store writes into
//! bucket = "profiles"
//! public_base_url = "http://localhost:8000/storage/v1/object/public"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CompressionOptions, Quality};
use crate::storage::LocalStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `tayo.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Normalization settings.
    pub compression: CompressionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Local object store settings.
    pub storage: StorageConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compression
            .to_options()
            .check()
            .map_err(|msg| ConfigError::Validation(format!("compression: {msg}")))?;
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.storage.bucket.is_empty() || self.storage.bucket.contains('/') {
            return Err(ConfigError::Validation(
                "storage.bucket must be a single non-empty path segment".into(),
            ));
        }
        Ok(())
    }
}

/// Image normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// JPEG quality as a fraction in `(0, 1]`.
    pub quality: f32,
    /// Output width bound in pixels.
    pub max_width: u32,
    /// Extension for derived output file names.
    pub extension: String,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        let opts = CompressionOptions::default();
        Self {
            quality: opts.quality.value(),
            max_width: opts.max_width,
            extension: opts.extension,
        }
    }
}

impl CompressionConfig {
    pub fn to_options(&self) -> CompressionOptions {
        CompressionOptions {
            quality: Quality::new(self.quality),
            max_width: self.max_width,
            extension: self.extension.clone(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel normalization workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Local object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory objects are written under.
    pub root: PathBuf,
    /// Bucket name; the first path segment under `root` and in URLs.
    pub bucket: String,
    /// Prefix for public URLs.
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
            bucket: "profiles".to_string(),
            public_base_url: "http://localhost:8000/storage/v1/object/public".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn local_store(&self) -> LocalStore {
        LocalStore::new(&self.root, &self.bucket, &self.public_base_url)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `tayo.toml` path.
///
/// A missing file yields the stock defaults; a present but invalid file is
/// an error.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let overlay = if path.exists() {
        let content = fs::read_to_string(path)?;
        Some(toml::from_str::<toml::Value>(&content)?)
    } else {
        None
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `tayo.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# tayo-photos configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Normalization
# ---------------------------------------------------------------------------
[compression]
# JPEG quality as a fraction: 0.1 is tiny and blocky, 1.0 is near-lossless.
quality = 0.7

# Photos wider than this are scaled down (aspect ratio kept). Narrower
# photos are never scaled up.
max_width = 800

# Extension for output file names (source base name is kept).
extension = "jpg"

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit for auto (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Local object store (used by `tayo-photos upload`)
# ---------------------------------------------------------------------------
[storage]
root = "storage"
bucket = "profiles"
public_base_url = "http://localhost:8000/storage/v1/object/public"
"##
}
