//! Sorting strategies and the batch runner that drives them.
//!
//! A batch run moves through fixed stages: Enumerating -> Extracting ->
//! Planning -> Executing -> Finalizing. Each stage processes the whole
//! batch before the next begins, on a single thread; a host that wants a
//! responsive UI runs the whole batch on a background worker and receives
//! progress through the callback, but never parallelizes the stages.

pub mod checkpoint;
pub mod color;
pub mod flatten;
pub mod lora_stack;
pub mod metadata_only;
pub mod search;

pub use checkpoint::CheckpointSorter;
pub use color::ColorSorter;
pub use flatten::ImageFlattener;
pub use lora_stack::LoraStackSorter;
pub use metadata_only::{MetadataOnlyOptions, generate_sidecars};
pub use search::{MatchMode, MetadataSearchSorter};

use crate::models::{
    ExtractionStatus, FileOutcome, OperationPlan, ProgressEvent, RunReport, SourceImage,
};
use crate::services::discover::{self, Discovery};
use crate::services::{fileops, metadata, session::SessionLog, summary};
use crate::{Result, SortOptions};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress callback invoked after each file completes.
pub type ProgressFn<'a> = &'a dyn Fn(&ProgressEvent);

/// Common interface implemented by sorting strategies.
pub trait SortStrategy {
    /// Identify the strategy for logging and the session log header.
    fn name(&self) -> &'static str;

    /// How the batch is discovered; flat unless the strategy needs recursion.
    fn discovery(&self) -> Discovery {
        Discovery::Flat
    }

    /// Whether the strategy consumes embedded metadata. Strategies that do
    /// not (color) skip the extraction stage entirely.
    fn needs_metadata(&self) -> bool {
        true
    }

    /// Build one operation plan per file that should be sorted. Files the
    /// strategy excludes produce no plan and are left untouched.
    fn plan(&self, batch: &[SourceImage], opts: &SortOptions) -> Result<Vec<OperationPlan>>;

    /// Hook invoked after execution, before the session log closes.
    fn finalize(&self, _opts: &SortOptions, _session: &mut SessionLog) {}
}

/// Run one batch with the given strategy.
///
/// Fatal preconditions (missing or unreadable source directory) return an
/// error before any filesystem mutation. Per-file problems are downgraded
/// to session log entries and the batch continues. The cancel flag is
/// checked between files; files already processed keep their new location
/// and the report reflects the partial progress.
pub fn run_batch(
    strategy: &dyn SortStrategy,
    opts: &SortOptions,
    progress: Option<ProgressFn<'_>>,
    cancel: Option<&AtomicBool>,
) -> Result<RunReport> {
    // Enumerating
    discover::check_source_dir(&opts.source)?;
    let records = discover::enumerate(&opts.source, strategy.discovery())?;
    let total = records.len();
    log::info!(
        "{}: {total} image(s) in {}",
        strategy.name(),
        opts.source.display()
    );

    let mut session = if opts.no_log_file {
        SessionLog::new(strategy.name())
    } else {
        SessionLog::with_log_file(strategy.name(), &opts.destination)?
    };
    session.note(&format!(
        "source={} destination={} mode={}",
        opts.source.display(),
        opts.destination.display(),
        opts.mode
    ));

    let cancelled = |session: &mut SessionLog| {
        let hit = cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
        if hit {
            session.mark_cancelled();
        }
        hit
    };

    // Extracting
    let mut batch: Vec<SourceImage> = Vec::with_capacity(records.len());
    for record in records {
        if cancelled(&mut session) {
            return Ok(session.finish(total));
        }
        let (meta, status) = if strategy.needs_metadata() {
            metadata::extract(&record.path)
        } else {
            (Default::default(), ExtractionStatus::Extracted)
        };
        if status == ExtractionStatus::MetadataMissing {
            session.note_metadata_missing(&record.file_name());
        }
        batch.push(SourceImage {
            record,
            metadata: meta,
            status,
        });
    }

    // Planning
    let plans = strategy.plan(&batch, opts)?;
    let by_source: HashMap<PathBuf, &SourceImage> = batch
        .iter()
        .map(|src| (src.record.path.clone(), src))
        .collect();

    // Executing
    let mut processed = 0usize;
    for plan in &plans {
        if cancelled(&mut session) {
            return Ok(session.finish(total));
        }

        let file_name = plan
            .source_image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = fileops::execute(plan);

        if let FileOutcome::Sorted { destination } = &outcome {
            maybe_write_sidecar(opts, plan, destination, by_source.get(&plan.source_image));
        }
        session.record(&file_name, &outcome);

        processed += 1;
        if let Some(progress) = progress {
            progress(&ProgressEvent {
                processed,
                total: plans.len(),
                current_file: file_name,
            });
        }
    }

    // Finalizing
    strategy.finalize(opts, &mut session);
    Ok(session.finish(total))
}

/// Generate a formatted sidecar at the destination when requested and the
/// image did not already bring one along.
fn maybe_write_sidecar(
    opts: &SortOptions,
    plan: &OperationPlan,
    destination: &std::path::Path,
    source: Option<&&SourceImage>,
) {
    if !opts.write_sidecars || plan.source_sidecar.is_some() {
        return;
    }
    let Some(source) = source else { return };
    if source.status != ExtractionStatus::Extracted || source.metadata.is_empty() {
        return;
    }

    let sidecar_path = destination.with_extension("txt");
    let image_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Err(err) = summary::write_sidecar(&sidecar_path, &source.metadata, &image_name) {
        log::warn!("Sidecar generation failed for {image_name}: {err}");
    }
}
