//! Image Sorting Library
//!
//! This library organizes AI-generated images (ComfyUI and compatible
//! producers) by the workflow metadata embedded in their PNG text chunks.
//! It extracts a structured record per image (checkpoint, LoRA stack,
//! prompts, sampler settings), derives stable classification keys from it,
//! and applies collision-safe move/copy operations that keep an image and
//! its sidecar metadata file together.

pub mod cli;
pub mod models;
pub mod services;
pub mod sorters;

pub use models::{
    ClassificationKey, ExtractionStatus, FileOutcome, ImageRecord, LoraEntry, OperationMode,
    OperationPlan, ProgressEvent, RunReport, SourceImage, WorkflowMetadata,
};
pub use sorters::{SortStrategy, run_batch};

use std::path::PathBuf;

/// Custom error type for the library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Source directory not found: {0}")]
    SourceNotFound(String),
    #[error("Source path is not a directory: {0}")]
    SourceNotADirectory(String),
    #[error("Image decode error for {path}: {message}")]
    ImageDecode { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Shared options for one batch run of a sorter
#[derive(Debug, Clone)]
pub struct SortOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: OperationMode,
    /// Write a formatted metadata sidecar next to each sorted image.
    pub write_sidecars: bool,
    /// Skip creation of the on-disk session log (in-memory stats only).
    pub no_log_file: bool,
}

impl SortOptions {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(source: P, destination: P) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode: OperationMode::Copy,
            write_sidecars: false,
            no_log_file: false,
        }
    }
}
