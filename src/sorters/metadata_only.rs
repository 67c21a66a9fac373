//! Metadata-only mode: generate sidecar text files without moving images.
//!
//! For every image with usable metadata, writes the formatted sidecar next
//! to it (or mirrored into an output directory). Originals stay where they
//! are; existing sidecars are skipped unless overwrite is requested.

use crate::models::{ExtractionStatus, ProgressEvent, RunReport};
use crate::services::discover::{self, Discovery};
use crate::services::{metadata, session::SessionLog, summary};
use crate::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub struct MetadataOnlyOptions {
    pub source: PathBuf,
    /// Mirror sidecars into this directory instead of alongside the images.
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub recursive: bool,
    pub no_log_file: bool,
}

impl MetadataOnlyOptions {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(source: P) -> Self {
        Self {
            source: source.into(),
            output_dir: None,
            overwrite: false,
            recursive: false,
            no_log_file: false,
        }
    }
}

/// Generate metadata sidecars for a directory of images.
pub fn generate_sidecars(
    opts: &MetadataOnlyOptions,
    progress: Option<super::ProgressFn<'_>>,
    cancel: Option<&AtomicBool>,
) -> Result<RunReport> {
    discover::check_source_dir(&opts.source)?;
    let discovery = if opts.recursive {
        Discovery::Recursive
    } else {
        Discovery::Flat
    };
    let records = discover::enumerate(&opts.source, discovery)?;
    let total = records.len();

    let log_dir = opts.output_dir.as_ref().unwrap_or(&opts.source);
    let mut session = if opts.no_log_file {
        SessionLog::new("metadata-only")
    } else {
        SessionLog::with_log_file("metadata-only", log_dir)?
    };
    session.note(&format!("source={}", opts.source.display()));

    for (index, record) in records.iter().enumerate() {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            session.mark_cancelled();
            return Ok(session.finish(total));
        }

        let file_name = record.file_name();
        let sidecar_path = sidecar_target(opts, &record.path);

        if sidecar_path.exists() && !opts.overwrite {
            session.record_skip(&file_name, "sidecar already exists");
        } else {
            let (meta, status) = metadata::extract(&record.path);
            if status == ExtractionStatus::MetadataMissing {
                session.note_metadata_missing(&file_name);
                session.record_skip(&file_name, "no metadata to summarize");
            } else {
                if let Some(parent) = sidecar_path.parent() {
                    if let Err(err) = std::fs::create_dir_all(parent) {
                        session.record_failure(&file_name, &format!("cannot create {}: {err}", parent.display()));
                        continue;
                    }
                }
                match summary::write_sidecar(&sidecar_path, &meta, &file_name) {
                    Ok(()) => session.record_success(&file_name, &sidecar_path.display().to_string()),
                    Err(err) => session.record_failure(&file_name, &format!("sidecar write failed: {err}")),
                }
            }
        }

        if let Some(progress) = progress {
            progress(&ProgressEvent {
                processed: index + 1,
                total,
                current_file: file_name,
            });
        }
    }

    Ok(session.finish(total))
}

/// Sidecar path: alongside the image, or mirrored under the output dir
/// preserving the source-relative structure.
fn sidecar_target(opts: &MetadataOnlyOptions, image: &std::path::Path) -> PathBuf {
    match &opts.output_dir {
        Some(output) => {
            let relative = image.strip_prefix(&opts.source).unwrap_or(image);
            output.join(relative).with_extension("txt")
        }
        None => image.with_extension("txt"),
    }
}
