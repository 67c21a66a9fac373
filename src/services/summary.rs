//! Human-readable sidecar text generated from extracted metadata.

use crate::models::WorkflowMetadata;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Format one image's metadata as sectioned sidecar text.
#[must_use]
pub fn format_metadata(meta: &WorkflowMetadata, image_name: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== IMAGE ===");
    let _ = writeln!(out, "file: {image_name}");
    let _ = writeln!(out);

    let _ = writeln!(out, "=== CHECKPOINT ===");
    if meta.checkpoint_name.is_empty() {
        let _ = writeln!(out, "(none identified)");
    } else {
        let _ = writeln!(out, "{}", meta.checkpoint_name);
    }
    let _ = writeln!(out);

    if !meta.lora_stack.is_empty() {
        let _ = writeln!(out, "=== LORAS ===");
        for (i, lora) in meta.lora_stack.iter().enumerate() {
            let _ = writeln!(out, "{}. {} (strength: {:.2})", i + 1, lora.name, lora.strength);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "=== PROMPTS ===");
    let _ = writeln!(out, "positive: {}", meta.positive_prompt);
    let _ = writeln!(out, "negative: {}", meta.negative_prompt);
    let _ = writeln!(out);

    if !meta.sampler_settings.is_empty() {
        let _ = writeln!(out, "=== SAMPLER ===");
        for (name, value) in &meta.sampler_settings {
            let _ = writeln!(out, "{name}: {value}");
        }
    }

    out
}

/// Write the formatted sidecar next to the given path.
pub fn write_sidecar(sidecar_path: &Path, meta: &WorkflowMetadata, image_name: &str) -> io::Result<()> {
    fs::write(sidecar_path, format_metadata(meta, image_name))
}
