//! Collision-safe execution of operation plans.
//!
//! An image and its sidecar metadata file move as one unit: the sidecar
//! always uses the same operation mode and the same collision-resolved base
//! name as the image. Destination names never overwrite an existing file.

use crate::models::{FileOutcome, OperationMode, OperationPlan};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Execute one operation plan.
///
/// Per-file failures are returned as [`FileOutcome`] variants rather than
/// errors so a batch can continue past them.
pub fn execute(plan: &OperationPlan) -> FileOutcome {
    if !plan.source_image.exists() {
        return FileOutcome::Skipped {
            reason: "source file no longer exists".to_string(),
        };
    }

    if let Err(err) = fs::create_dir_all(&plan.destination_folder) {
        return FileOutcome::Failed {
            reason: format!(
                "cannot create destination folder {}: {err}",
                plan.destination_folder.display()
            ),
        };
    }

    let has_sidecar = plan.source_sidecar.is_some();
    let image_name = resolve_collision(
        &plan.destination_folder,
        &plan.destination_image_name,
        has_sidecar,
    );
    let dest_image = plan.destination_folder.join(&image_name);

    if let Err(err) = transfer(&plan.source_image, &dest_image, plan.mode) {
        return FileOutcome::Failed {
            reason: format!("image write failed: {err}"),
        };
    }

    if let Some(source_sidecar) = &plan.source_sidecar {
        let dest_sidecar = plan
            .destination_folder
            .join(OperationPlan::sidecar_name_for(&image_name));
        if let Err(err) = transfer(source_sidecar, &dest_sidecar, plan.mode) {
            // The image already landed; report the pair as failed so the
            // session log shows the sidecar did not follow it.
            log::error!(
                "Sidecar transfer failed for {}: {err}",
                source_sidecar.display()
            );
            return FileOutcome::Failed {
                reason: format!(
                    "image written to {} but sidecar transfer failed: {err}",
                    dest_image.display()
                ),
            };
        }
    }

    log::debug!(
        "{}: {} -> {}",
        plan.mode,
        plan.source_image.display(),
        dest_image.display()
    );
    FileOutcome::Sorted {
        destination: dest_image,
    }
}

/// Find a free destination name by appending `_1`, `_2`, ... to the stem.
///
/// Existence of the planned image name alone triggers suffixing; no content
/// comparison is performed. When a sidecar travels along, its slot must be
/// free under the same suffix so the pair is never split.
#[must_use]
pub fn resolve_collision(folder: &Path, image_name: &str, has_sidecar: bool) -> String {
    if is_free(folder, image_name, has_sidecar) {
        return image_name.to_string();
    }

    let (stem, ext) = match image_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (image_name, None),
    };

    let mut counter = 1u32;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        if is_free(folder, &candidate, has_sidecar) {
            return candidate;
        }
        counter += 1;
    }
}

fn is_free(folder: &Path, image_name: &str, has_sidecar: bool) -> bool {
    if folder.join(image_name).exists() {
        return false;
    }
    if has_sidecar {
        let sidecar = OperationPlan::sidecar_name_for(image_name);
        if folder.join(sidecar).exists() {
            return false;
        }
    }
    true
}

/// Move or copy a single file.
///
/// Move prefers an atomic rename and falls back to copy-then-remove across
/// filesystems. Copies are length-verified; a short write is removed rather
/// than left masquerading as a success.
fn transfer(source: &Path, dest: &Path, mode: OperationMode) -> io::Result<()> {
    match mode {
        OperationMode::Move => {
            if fs::rename(source, dest).is_ok() {
                return Ok(());
            }
            copy_verified(source, dest)?;
            fs::remove_file(source)
        }
        OperationMode::Copy => copy_verified(source, dest),
    }
}

fn copy_verified(source: &Path, dest: &Path) -> io::Result<()> {
    let expected = fs::metadata(source)?.len();
    let written = match fs::copy(source, dest) {
        Ok(written) => written,
        Err(err) => {
            remove_partial(dest);
            return Err(err);
        }
    };
    if written != expected {
        remove_partial(dest);
        return Err(io::Error::other(format!(
            "short write: {written} of {expected} bytes for {}",
            dest.display()
        )));
    }
    Ok(())
}

fn remove_partial(dest: &Path) {
    if dest.exists() {
        if let Err(err) = fs::remove_file(dest) {
            log::warn!(
                "Could not remove partial destination {}: {err}",
                dest.display()
            );
        }
    }
}

/// Locate the sidecar for an image path, if one exists on disk.
#[must_use]
pub fn sidecar_for(image: &Path) -> Option<PathBuf> {
    let sidecar = image.with_extension("txt");
    if sidecar.exists() { Some(sidecar) } else { None }
}
