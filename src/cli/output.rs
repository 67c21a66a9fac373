//! Output formatting for CLI

use crate::models::{ProgressEvent, RunReport};
use std::io::{self, Write};

/// One-line progress indicator, overwritten in place.
pub fn print_progress(event: &ProgressEvent) {
    eprint!(
        "\r[{}/{}] {}\x1b[K",
        event.processed, event.total, event.current_file
    );
    let _ = io::stderr().flush();
}

/// Clear the progress line once the batch is done.
pub fn clear_progress() {
    eprint!("\r\x1b[K");
    let _ = io::stderr().flush();
}

/// Human-readable run summary.
pub fn print_summary(report: &RunReport) {
    println!("Sorter:           {}", report.sorter);
    println!("Files discovered: {}", report.total);
    println!("Succeeded:        {}", report.succeeded);
    println!("Skipped:          {}", report.skipped);
    println!("Failed:           {}", report.failed);
    println!("Missing metadata: {}", report.metadata_missing);
    println!("Elapsed:          {:.2}s", report.elapsed_ms as f64 / 1000.0);
    if report.cancelled {
        println!("Run was cancelled before completion");
    }
    if let Some(path) = &report.log_path {
        println!("Session log:      {path}");
    }
}

/// Machine-readable run summary.
#[must_use]
pub fn format_json(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
