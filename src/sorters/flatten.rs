//! Flatten nested image trees into a single destination directory.
//!
//! Folder structure is lost, so filenames gain a descriptive prefix built
//! from metadata (checkpoint and sampler) to stay searchable. The standard
//! collision policy guarantees no two distinct sources land on one name.

use super::SortStrategy;
use crate::models::{OperationMode, OperationPlan, SourceImage};
use crate::services::classify;
use crate::services::discover::Discovery;
use crate::services::session::SessionLog;
use crate::{Result, SortOptions};
use std::fs;
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct ImageFlattener {
    /// Remove source subdirectories emptied by a move.
    pub remove_empty_dirs: bool,
}

impl SortStrategy for ImageFlattener {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn discovery(&self) -> Discovery {
        Discovery::Recursive
    }

    fn plan(&self, batch: &[SourceImage], opts: &SortOptions) -> Result<Vec<OperationPlan>> {
        let mut plans = Vec::with_capacity(batch.len());
        for src in batch {
            // A destination nested inside the source must not re-flatten
            // files that already live there.
            if src.record.path.starts_with(&opts.destination) {
                continue;
            }
            let original = src.record.file_name();
            let name = match name_prefix(src) {
                Some(prefix) => format!("{prefix}_{original}"),
                None => original,
            };
            plans.push(OperationPlan {
                source_image: src.record.path.clone(),
                source_sidecar: src.record.sidecar_path.clone(),
                destination_folder: opts.destination.clone(),
                destination_image_name: name,
                mode: opts.mode,
            });
        }
        Ok(plans)
    }

    fn finalize(&self, opts: &SortOptions, session: &mut SessionLog) {
        if !self.remove_empty_dirs || opts.mode != OperationMode::Move {
            return;
        }
        let removed = remove_empty_dirs(&opts.source);
        if removed > 0 {
            session.note(&format!("removed {removed} emptied source directories"));
        }
    }
}

/// Descriptive prefix: sanitized checkpoint stem plus sampler name.
fn name_prefix(src: &SourceImage) -> Option<String> {
    let meta = &src.metadata;
    if meta.checkpoint_name.is_empty() {
        return None;
    }
    let checkpoint = classify::checkpoint_key(meta);
    match meta.sampler_settings.get("sampler_name") {
        Some(sampler) => {
            let sampler = classify::sanitize_component(sampler);
            if sampler.is_empty() {
                Some(checkpoint.as_str().to_string())
            } else {
                Some(format!("{checkpoint}_{sampler}"))
            }
        }
        None => Some(checkpoint.as_str().to_string()),
    }
}

/// Remove empty directories bottom-up, leaving the root in place.
fn remove_empty_dirs(root: &std::path::Path) -> usize {
    let mut removed = 0usize;
    for entry in WalkDir::new(root).contents_first(true).into_iter().flatten() {
        if !entry.file_type().is_dir() || entry.path() == root {
            continue;
        }
        // remove_dir fails on non-empty directories, which is the filter
        if fs::remove_dir(entry.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}
