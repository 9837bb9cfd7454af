//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Normalize
//!
//! ```text
//! 001 IMG_0042.png → IMG_0042.jpg
//!     Size: 4032x3024 → 800x600
//!     Bytes: 2.4 MiB → 61.2 KiB
//! 002 notes.txt
//!     Failed (decode): cannot decode notes.txt: unrecognized image format
//! 003 picks/locked.jpg
//!     Failed (read): Permission denied (os error 13)
//!
//! Normalized 1 of 3 images (2 failed)
//! ```
//!
//! ## Upload
//!
//! ```text
//! Avatar
//!     u1/avatar.jpg → http://localhost:8000/.../profiles/u1/avatar.jpg
//! Gallery
//! 001 beach.jpg → u1/gallery/9b0e4d2a7c1f3e88.jpg
//!     URL: http://localhost:8000/.../profiles/u1/gallery/9b0e4d2a7c1f3e88.jpg
//! Duplicates
//!     beach-copy.jpg → u1/gallery/9b0e4d2a7c1f3e88.jpg
//! Failed
//!     bad.png: cannot decode bad.png: unrecognized image format
//!     picks/locked.jpg: cannot read: Permission denied (os error 13)
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::normalize::{BatchFailure, BatchOutcome};
use crate::types::{NormalizedImage, ReadFailure, SourceImage};
use crate::upload::{GalleryOutcome, UploadedImage};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count using binary units.
pub fn format_bytes(n: usize) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if n < 1024 {
        return format!("{n} B");
    }
    let mut value = n as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn failure_line(failure: &BatchFailure) -> String {
    format!(
        "{}Failed ({}): {}",
        indent(1),
        failure.error.kind(),
        failure.error
    )
}

/// Format a normalize batch report.
///
/// `sources` must be the slice the batch was run on; outputs are matched back
/// to their sources by position, skipping the failed indices. Files that
/// could not be read are listed after them and count towards the total.
pub fn format_normalize_output(
    sources: &[SourceImage],
    outcome: &BatchOutcome,
    unreadable: &[ReadFailure],
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut images = outcome.images.iter();
    let mut failures = outcome.failures.iter().peekable();

    for (i, source) in sources.iter().enumerate() {
        if failures.peek().is_some_and(|f| f.index == i) {
            if let Some(failure) = failures.next() {
                lines.push(format!("{} {}", format_index(i + 1), source.name));
                lines.push(failure_line(failure));
            }
            continue;
        }
        if let Some(image) = images.next() {
            lines.extend(image_lines(i + 1, source, image));
        }
    }

    for (i, failure) in unreadable.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(sources.len() + i + 1),
            failure.path.display()
        ));
        lines.push(format!("{}Failed (read): {}", indent(1), failure.reason));
    }

    lines.push(String::new());
    lines.push(summary_line(
        sources.len() + unreadable.len(),
        outcome.images.len(),
        outcome.failures.len() + unreadable.len(),
    ));
    lines
}

fn image_lines(index: usize, source: &SourceImage, image: &NormalizedImage) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} → {}",
        format_index(index),
        source.name,
        image.name
    )];
    lines.push(format!("{}Size: {}x{}", indent(1), image.width, image.height));
    lines.push(format!(
        "{}Bytes: {} → {}",
        indent(1),
        format_bytes(source.data.len()),
        format_bytes(image.byte_len())
    ));
    lines
}

fn summary_line(total: usize, ok: usize, failed: usize) -> String {
    if failed == 0 {
        format!("Normalized {ok} of {total} images")
    } else {
        format!("Normalized {ok} of {total} images ({failed} failed)")
    }
}

pub fn print_normalize_output(
    sources: &[SourceImage],
    outcome: &BatchOutcome,
    unreadable: &[ReadFailure],
) {
    for line in format_normalize_output(sources, outcome, unreadable) {
        println!("{}", line);
    }
}

/// Format the result of an `upload` run.
pub fn format_upload_output(
    avatar: Option<&UploadedImage>,
    gallery: &GalleryOutcome,
    unreadable: &[ReadFailure],
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(avatar) = avatar {
        lines.push("Avatar".to_string());
        lines.push(format!("{}{} → {}", indent(1), avatar.key, avatar.url));
    }

    if !gallery.uploaded.is_empty() {
        lines.push("Gallery".to_string());
        for (i, item) in gallery.uploaded.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                item.image.name,
                item.key
            ));
            lines.push(format!("{}URL: {}", indent(1), item.url));
        }
    }

    if !gallery.duplicates.is_empty() {
        lines.push("Duplicates".to_string());
        for dup in &gallery.duplicates {
            lines.push(format!("{}{} → {}", indent(1), dup.name, dup.key));
        }
    }

    if !gallery.failures.is_empty() || !unreadable.is_empty() {
        lines.push("Failed".to_string());
        for failure in &gallery.failures {
            lines.push(format!("{}{}: {}", indent(1), failure.name, failure.error));
        }
        for failure in unreadable {
            lines.push(format!(
                "{}{}: cannot read: {}",
                indent(1),
                failure.path.display(),
                failure.reason
            ));
        }
    }

    lines
}

pub fn print_upload_output(
    avatar: Option<&UploadedImage>,
    gallery: &GalleryOutcome,
    unreadable: &[ReadFailure],
) {
    for line in format_upload_output(avatar, gallery, unreadable) {
        println!("{}", line);
    }
}
