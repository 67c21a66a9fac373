//! Sort images purely by LoRA-stack signature.
//!
//! Ignores checkpoint entirely: the point is comparing the effect of a
//! style combination across different base models.

use super::SortStrategy;
use crate::models::{OperationPlan, SourceImage};
use crate::services::classify;
use crate::{Result, SortOptions};

#[derive(Debug, Default)]
pub struct LoraStackSorter;

impl SortStrategy for LoraStackSorter {
    fn name(&self) -> &'static str {
        "lora-stack"
    }

    fn plan(&self, batch: &[SourceImage], opts: &SortOptions) -> Result<Vec<OperationPlan>> {
        let mut plans = Vec::with_capacity(batch.len());
        for src in batch {
            let key = classify::lora_stack_key(&src.metadata);
            plans.push(OperationPlan {
                source_image: src.record.path.clone(),
                source_sidecar: src.record.sidecar_path.clone(),
                destination_folder: opts.destination.join(key.as_str()),
                destination_image_name: src.record.file_name(),
                mode: opts.mode,
            });
        }
        Ok(plans)
    }
}
