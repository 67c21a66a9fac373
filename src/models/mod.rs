//! Data models for image records, workflow metadata, and operation plans

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One source file discovered during batch enumeration.
///
/// Immutable after construction; the image and its sidecar (a `.txt` file
/// sharing the image's base name) form a single logical unit.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub sidecar_path: Option<PathBuf>,
}

impl ImageRecord {
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One LoRA application within a workflow: name plus model strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoraEntry {
    pub name: String,
    pub strength: f32,
}

/// Structured decode of the workflow metadata embedded in an image.
///
/// All fields default to empty when no metadata is present or the embedded
/// blob does not parse; absence is a recorded condition, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub checkpoint_name: String,
    pub lora_stack: Vec<LoraEntry>,
    pub positive_prompt: String,
    pub negative_prompt: String,
    /// Sampler settings keyed by name (steps, cfg, sampler_name, ...).
    /// Stored sorted so repeated extraction is byte-stable.
    pub sampler_settings: BTreeMap<String, String>,
}

impl WorkflowMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkpoint_name.is_empty()
            && self.lora_stack.is_empty()
            && self.positive_prompt.is_empty()
            && self.negative_prompt.is_empty()
            && self.sampler_settings.is_empty()
    }
}

/// Side-channel status describing how extraction went for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// A recognized metadata slot parsed as a workflow graph.
    Extracted,
    /// No recognized slot, unreadable file, or unparsable blob.
    MetadataMissing,
}

/// A discovered file paired with its extracted metadata.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub record: ImageRecord,
    pub metadata: WorkflowMetadata,
    pub status: ExtractionStatus,
}

/// Grouping identity used to choose a destination folder.
///
/// Always filesystem-safe: constructors sanitize and, for long LoRA-stack
/// signatures, truncate with a stable hash suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassificationKey(String);

impl ClassificationKey {
    #[must_use]
    pub fn new(folder: String) -> Self {
        Self(folder)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClassificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a batch copies or moves files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    #[default]
    Copy,
    Move,
}

impl OperationMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationMode::Copy => "copy",
            OperationMode::Move => "move",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "copy" => Some(OperationMode::Copy),
            "move" => Some(OperationMode::Move),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned file operation: image plus optional sidecar, as a unit.
#[derive(Debug, Clone)]
pub struct OperationPlan {
    pub source_image: PathBuf,
    pub source_sidecar: Option<PathBuf>,
    pub destination_folder: PathBuf,
    pub destination_image_name: String,
    pub mode: OperationMode,
}

impl OperationPlan {
    /// Sidecar name derived from the image name; collision suffixes applied
    /// to the image name carry over automatically.
    #[must_use]
    pub fn sidecar_name_for(image_name: &str) -> String {
        match image_name.rsplit_once('.') {
            Some((stem, _ext)) => format!("{stem}.txt"),
            None => format!("{image_name}.txt"),
        }
    }
}

/// Outcome of executing one operation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Image (and sidecar, when present) written to this destination.
    Sorted { destination: PathBuf },
    /// Source vanished or became unreadable between enumeration and execution.
    Skipped { reason: String },
    /// Destination write failed; the batch continues.
    Failed { reason: String },
}

/// Progress event emitted after each file completes.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub current_file: String,
}

/// Final aggregate report for one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub sorter: String,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub metadata_missing: usize,
    pub elapsed_ms: u64,
    pub cancelled: bool,
    pub log_path: Option<String>,
}
