use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tayo_photos::config;
use tayo_photos::imaging::{CompressionOptions, Quality, RustBackend, supported_input_extensions};
use tayo_photos::normalize::normalize_batch;
use tayo_photos::output;
use tayo_photos::types::{NormalizedImage, SourceImage, read_sources};
use tayo_photos::upload::{GalleryOutcome, Uploader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const MANIFEST_NAME: &str = "manifest.json";

/// Per-run overrides for the `[compression]` config section.
#[derive(clap::Args, Clone)]
struct CompressionArgs {
    /// JPEG quality as a fraction in (0, 1]
    #[arg(long)]
    quality: Option<f32>,
    /// Maximum output width in pixels
    #[arg(long)]
    max_width: Option<u32>,
}

impl CompressionArgs {
    fn apply(&self, mut options: CompressionOptions) -> CompressionOptions {
        if let Some(q) = self.quality {
            options.quality = Quality::new(q);
        }
        if let Some(w) = self.max_width {
            options.max_width = w;
        }
        options
    }
}

#[derive(Parser)]
#[command(name = "tayo-photos")]
#[command(version)]
#[command(about = "Normalize and upload profile photos")]
#[command(long_about = "\
Normalize and upload profile photos

Every photo is decoded, scaled down to at most max_width pixels wide (never
up), and re-encoded as JPEG. Aspect ratio is preserved.

  tayo-photos normalize ~/Pictures/picks -o normalized
  tayo-photos upload --owner 5f1c --avatar me.heic.png beach.jpg hike.webp

Failed photos are reported and skipped; the rest are still written.

Run 'tayo-photos gen-config' to generate a documented tayo.toml.")]
struct Cli {
    /// Config file (missing file = defaults)
    #[arg(long, default_value = "tayo.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize image files or directories into JPEGs
    Normalize {
        /// Image files or directories to scan
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = "normalized")]
        output: PathBuf,
        #[command(flatten)]
        compression: CompressionArgs,
    },
    /// Normalize and store an avatar and gallery photos for a profile
    Upload {
        /// Profile owner id; first segment of every storage key
        #[arg(long)]
        owner: String,
        /// Avatar image
        #[arg(long)]
        avatar: Option<PathBuf>,
        /// Gallery images
        gallery: Vec<PathBuf>,
        #[command(flatten)]
        compression: CompressionArgs,
    },
    /// Print a stock tayo.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize {
            inputs,
            output: output_dir,
            compression,
        } => {
            let tool_config = config::load_config(&cli.config)?;
            init_thread_pool(&tool_config.processing);
            let options = compression.apply(tool_config.compression.to_options());

            let files = collect_inputs(&inputs);
            let (sources, unreadable) = read_sources(&files);
            if sources.is_empty() {
                return Err("no readable images in inputs".into());
            }

            let mut outcome = normalize_batch(&sources, &options)?;
            write_outputs(&output_dir, &mut outcome.images)?;

            output::print_normalize_output(&sources, &outcome, &unreadable);
        }
        Command::Upload {
            owner,
            avatar,
            gallery,
            compression,
        } => {
            let tool_config = config::load_config(&cli.config)?;
            init_thread_pool(&tool_config.processing);
            let options = compression.apply(tool_config.compression.to_options());

            let backend = RustBackend::new();
            let store = tool_config.storage.local_store();
            let uploader = Uploader::new(&backend, &store, options);

            let avatar = match avatar {
                Some(path) => {
                    let source = SourceImage::from_path(&path)?;
                    Some(uploader.upload_avatar(&owner, &source)?)
                }
                None => None,
            };

            let (gallery_sources, unreadable) = read_sources(&gallery);
            let gallery_outcome = if gallery_sources.is_empty() {
                GalleryOutcome::default()
            } else {
                uploader.upload_gallery(&owner, &gallery_sources)?
            };

            output::print_upload_output(avatar.as_ref(), &gallery_outcome, &unreadable);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Expand directories into the image files they contain.
///
/// Explicit file arguments are kept whatever their extension; directory
/// contents are filtered to decodable extensions and sorted by path.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(e) => Some(e),
                    Err(err) => {
                        warn!(%err, "skipping unreadable entry");
                        None
                    }
                })
                .filter(|e| e.file_type().is_file() && has_supported_extension(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            info!(dir = %input.display(), count = found.len(), "scanned directory");
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Write each image into `dir` under a name unique within the run, then
/// `manifest.json`. Images are renamed in place so the manifest and the
/// report name the files actually written.
fn write_outputs(
    dir: &Path,
    images: &mut [NormalizedImage],
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let mut taken = HashSet::from([MANIFEST_NAME.to_string()]);
    for image in images.iter_mut() {
        image.name = unique_name(&image.name, &mut taken);
        std::fs::write(dir.join(&image.name), &image.data)?;
    }
    let manifest = serde_json::to_string_pretty(&*images)?;
    std::fs::write(dir.join(MANIFEST_NAME), manifest)?;
    Ok(())
}

/// Make `name` unique within one output directory by suffixing `-2`, `-3`, ...
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_suffixes_collisions() {
        let mut taken = HashSet::new();
        assert_eq!(unique_name("a.jpg", &mut taken), "a.jpg");
        assert_eq!(unique_name("a.jpg", &mut taken), "a-2.jpg");
        assert_eq!(unique_name("a.jpg", &mut taken), "a-3.jpg");
        assert_eq!(unique_name("b", &mut taken), "b");
        assert_eq!(unique_name("b", &mut taken), "b-2");
    }

    fn output(name: &str, data: &[u8]) -> NormalizedImage {
        NormalizedImage {
            data: data.to_vec(),
            mime_type: "image/jpeg".into(),
            name: name.into(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn write_outputs_renames_collisions_and_manifest_agrees() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("out");
        let mut images = vec![
            output("photo.jpg", b"first"),
            output("photo.jpg", b"second"),
            output("manifest.json", b"third"),
        ];

        write_outputs(&dir, &mut images).unwrap();

        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["photo.jpg", "photo-2.jpg", "manifest-2.json"]);
        assert_eq!(std::fs::read(dir.join("photo.jpg")).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.join("photo-2.jpg")).unwrap(), b"second");
        assert_eq!(std::fs::read(dir.join("manifest-2.json")).unwrap(), b"third");

        let manifest: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join(MANIFEST_NAME)).unwrap()).unwrap();
        let listed: Vec<&str> = manifest
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["name"].as_str().unwrap())
            .collect();
        assert_eq!(listed, names);
    }

    #[test]
    fn supported_extension_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("x/IMG.JPG")));
        assert!(has_supported_extension(Path::new("x/a.png")));
        assert!(!has_supported_extension(Path::new("x/notes.txt")));
        assert!(!has_supported_extension(Path::new("x/noext")));
    }

    #[test]
    fn collect_inputs_walks_directories_sorted() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("picks");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        for name in ["b.jpg", "a.png", "readme.txt", "nested/c.webp"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }
        let loose = tmp.path().join("loose.txt");
        std::fs::write(&loose, b"x").unwrap();

        let files = collect_inputs(&[dir.clone(), loose.clone()]);
        assert_eq!(
            files,
            vec![
                dir.join("a.png"),
                dir.join("b.jpg"),
                dir.join("nested/c.webp"),
                loose,
            ]
        );
    }
}
