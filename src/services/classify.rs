//! Classification keys: stable grouping identities derived from metadata.
//!
//! The same metadata must always yield the same key, across calls and
//! across process runs, so re-running a sort is idempotent.

use crate::models::{ClassificationKey, LoraEntry, WorkflowMetadata};
use sha2::{Digest, Sha256};

/// Bucket for images whose metadata names no checkpoint.
pub const UNKNOWN_CHECKPOINT: &str = "unknown_checkpoint";

/// Bucket for images whose workflow applies no LoRAs.
pub const NO_LORAS: &str = "no_loras";

/// Maximum length of a destination folder segment. Joined LoRA signatures
/// beyond this are truncated with a hash suffix to stay inside common
/// filesystem path limits.
pub const MAX_FOLDER_LEN: usize = 200;

/// Hex characters of the content hash appended after truncation.
const HASH_SUFFIX_LEN: usize = 8;

/// Filesystem-safe delimiter between LoRA names in a stack signature.
const STACK_DELIMITER: &str = "+";

/// Checkpoint grouping key: sanitized checkpoint file stem, or the
/// `unknown_checkpoint` bucket when no checkpoint was identified.
#[must_use]
pub fn checkpoint_key(meta: &WorkflowMetadata) -> ClassificationKey {
    let stem = file_stem(&meta.checkpoint_name);
    let clean = sanitize_component(stem);
    if clean.is_empty() {
        ClassificationKey::new(UNKNOWN_CHECKPOINT.to_string())
    } else {
        ClassificationKey::new(clean)
    }
}

/// LoRA-stack grouping key: order-independent over application order.
///
/// Entries sort by name (ties broken by strength bits), names join with a
/// fixed delimiter, and strengths stay out of the key: composition, not
/// magnitude, defines a stack. Signatures longer than [`MAX_FOLDER_LEN`]
/// become a truncated prefix plus an 8-hex hash of the full signature, so
/// two distinct long stacks never collide after truncation.
#[must_use]
pub fn lora_stack_key(meta: &WorkflowMetadata) -> ClassificationKey {
    let mut entries: Vec<LoraEntry> = meta.lora_stack.clone();
    entries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.strength.total_cmp(&b.strength))
    });

    let mut names: Vec<String> = Vec::with_capacity(entries.len());
    for entry in &entries {
        let clean = sanitize_component(file_stem(&entry.name));
        if clean.is_empty() {
            continue;
        }
        if names.last().is_some_and(|prev| prev == &clean) {
            // Same LoRA applied twice with different strengths is a workflow
            // configuration anomaly; the name contributes once to the key.
            log::warn!(
                "Duplicate LoRA '{}' in one stack (strength {})",
                entry.name,
                entry.strength
            );
            continue;
        }
        names.push(clean);
    }

    if names.is_empty() {
        return ClassificationKey::new(NO_LORAS.to_string());
    }

    ClassificationKey::new(shorten(names.join(STACK_DELIMITER)))
}

/// Sanitize a string for use as a folder name: ASCII alphanumerics and
/// `-_.` pass through, everything else maps to `_`.
#[must_use]
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Strip any path prefix and extension from a model name. Workflow files
/// often reference models as `subdir\name.safetensors`.
fn file_stem(name: &str) -> &str {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => base,
    }
}

/// Enforce the folder length cap with a stable content-hash suffix.
fn shorten(signature: String) -> String {
    if signature.len() <= MAX_FOLDER_LEN {
        return signature;
    }

    let digest = Sha256::digest(signature.as_bytes());
    let mut hash = String::with_capacity(HASH_SUFFIX_LEN);
    for byte in digest.iter().take(HASH_SUFFIX_LEN / 2) {
        hash.push_str(&format!("{byte:02x}"));
    }

    let keep = MAX_FOLDER_LEN - HASH_SUFFIX_LEN - 1;
    let mut prefix: String = signature.chars().take(keep).collect();
    prefix.truncate(keep.min(prefix.len()));
    format!("{prefix}-{hash}")
}
