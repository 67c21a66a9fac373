//! Source directory enumeration and sidecar pairing.

use crate::models::ImageRecord;
use crate::services::fileops::sidecar_for;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recognized image extensions (lowercase, without dot).
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// How a sorter discovers its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discovery {
    /// Files directly in the source directory only.
    #[default]
    Flat,
    /// Files under the source directory at any depth.
    Recursive,
}

/// Fatal precondition check: the source directory must exist and be
/// readable before any filesystem mutation happens.
pub fn check_source_dir(source: &Path) -> Result<()> {
    if !source.exists() {
        return Err(Error::SourceNotFound(source.display().to_string()));
    }
    if !source.is_dir() {
        return Err(Error::SourceNotADirectory(source.display().to_string()));
    }
    // Surface permission problems now rather than mid-batch
    fs::read_dir(source)?;
    Ok(())
}

/// Enumerate image files in the source directory, pairing each with its
/// sidecar when one exists. Entries come back sorted by path so batch
/// order is deterministic. Unreadable entries are logged and skipped.
pub fn enumerate(source: &Path, discovery: Discovery) -> Result<Vec<ImageRecord>> {
    let mut paths: Vec<PathBuf> = match discovery {
        Discovery::Flat => {
            let mut paths = Vec::new();
            for entry in fs::read_dir(source)? {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log::warn!("Skipping unreadable directory entry: {err}");
                        continue;
                    }
                };
                let path = entry.path();
                if path.is_file() && is_image(&path) {
                    paths.push(path);
                }
            }
            paths
        }
        Discovery::Recursive => {
            let mut paths = Vec::new();
            for entry in WalkDir::new(source).follow_links(false) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log::warn!("Skipping unreadable entry: {err}");
                        continue;
                    }
                };
                if entry.file_type().is_file() && is_image(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
            paths
        }
    };

    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| {
            let sidecar_path = sidecar_for(&path);
            ImageRecord { path, sidecar_path }
        })
        .collect())
}

/// Check a path against the recognized image extensions.
#[must_use]
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}
