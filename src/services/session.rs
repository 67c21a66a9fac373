//! Session log: per-file outcomes and aggregate statistics for one run.
//!
//! The log is an explicit accumulator owned by the batch loop, never a
//! process-wide singleton. During a run it appends outcome lines to a
//! timestamped log file (one file per run); after `finish` the file gains a
//! trailing summary block and is never touched again.

use crate::models::{FileOutcome, RunReport};
use chrono::Local;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome category recorded per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Skipped,
    Failed,
}

impl OutcomeKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "OK",
            OutcomeKind::Skipped => "SKIP",
            OutcomeKind::Failed => "FAIL",
        }
    }
}

/// Accumulates outcomes for one batch run.
pub struct SessionLog {
    sorter: String,
    started: Instant,
    succeeded: usize,
    skipped: usize,
    failed: usize,
    metadata_missing: usize,
    cancelled: bool,
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl SessionLog {
    /// Start an in-memory session with no on-disk log file.
    #[must_use]
    pub fn new(sorter: &str) -> Self {
        Self {
            sorter: sorter.to_string(),
            started: Instant::now(),
            succeeded: 0,
            skipped: 0,
            failed: 0,
            metadata_missing: 0,
            cancelled: false,
            writer: None,
            path: None,
        }
    }

    /// Start a session that also appends to a timestamped log file in the
    /// given directory (created if absent).
    pub fn with_log_file(sorter: &str, dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("sort_session_{stamp}.log"));
        let file = File::create(&path)?;

        let mut session = Self::new(sorter);
        session.writer = Some(BufWriter::new(file));
        session.path = Some(path);
        session.line(&format!(
            "# {sorter} session started {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        Ok(session)
    }

    /// Record the outcome of one file operation.
    pub fn record(&mut self, file: &str, outcome: &FileOutcome) {
        let (kind, detail) = match outcome {
            FileOutcome::Sorted { destination } => {
                (OutcomeKind::Success, destination.display().to_string())
            }
            FileOutcome::Skipped { reason } => (OutcomeKind::Skipped, reason.clone()),
            FileOutcome::Failed { reason } => (OutcomeKind::Failed, reason.clone()),
        };
        match kind {
            OutcomeKind::Success => self.succeeded += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
        if kind == OutcomeKind::Failed {
            log::error!("{file}: {detail}");
        }
        self.line(&format!("{} {file} -> {detail}", kind.as_str()));
    }

    /// Record a successful file that needed no operation (metadata-only mode).
    pub fn record_success(&mut self, file: &str, detail: &str) {
        self.succeeded += 1;
        self.line(&format!("{} {file} -> {detail}", OutcomeKind::Success.as_str()));
    }

    /// Record a skip that happened before execution (filters, existing output).
    pub fn record_skip(&mut self, file: &str, reason: &str) {
        self.skipped += 1;
        self.line(&format!("{} {file} -> {reason}", OutcomeKind::Skipped.as_str()));
    }

    /// Record a failure that happened outside plan execution.
    pub fn record_failure(&mut self, file: &str, reason: &str) {
        self.failed += 1;
        log::error!("{file}: {reason}");
        self.line(&format!("{} {file} -> {reason}", OutcomeKind::Failed.as_str()));
    }

    /// Note that a file carried no usable metadata. Recoverable: the file
    /// still sorts into a fallback bucket.
    pub fn note_metadata_missing(&mut self, file: &str) {
        self.metadata_missing += 1;
        self.line(&format!("META {file} -> no workflow metadata"));
    }

    /// Free-form informational line.
    pub fn note(&mut self, message: &str) {
        self.line(&format!("# {message}"));
    }

    /// Mark the run as cooperatively cancelled.
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
        self.line("# run cancelled by caller");
    }

    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the trailing summary, flush the log file, and return the
    /// aggregate report. Consumes the session: a finished log is immutable.
    pub fn finish(mut self, total: usize) -> RunReport {
        let elapsed = self.started.elapsed();
        let report = RunReport {
            sorter: self.sorter.clone(),
            total,
            succeeded: self.succeeded,
            skipped: self.skipped,
            failed: self.failed,
            metadata_missing: self.metadata_missing,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            cancelled: self.cancelled,
            log_path: self.path.as_ref().map(|p| p.display().to_string()),
        };

        self.line("# --- summary ---");
        self.line(&format!("# total:            {}", report.total));
        self.line(&format!("# succeeded:        {}", report.succeeded));
        self.line(&format!("# skipped:          {}", report.skipped));
        self.line(&format!("# failed:           {}", report.failed));
        self.line(&format!("# metadata missing: {}", report.metadata_missing));
        self.line(&format!("# elapsed:          {:.2}s", elapsed.as_secs_f64()));
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writer.flush() {
                log::warn!("Session log flush failed: {err}");
            }
        }

        report
    }

    fn line(&mut self, text: &str) {
        log::info!("{text}");
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writeln!(writer, "{text}") {
                // Keep sorting even if the log disk fills; counters still hold
                log::warn!("Session log write failed: {err}");
                self.writer = None;
            }
        }
    }
}
