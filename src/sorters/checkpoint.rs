//! Sort images into folders by base checkpoint.

use super::SortStrategy;
use crate::models::{OperationPlan, SourceImage};
use crate::services::classify;
use crate::{Result, SortOptions};

/// Groups by checkpoint classification key, optionally sub-grouped by
/// LoRA-stack key inside each checkpoint folder.
#[derive(Debug, Default)]
pub struct CheckpointSorter {
    pub nested_lora: bool,
}

impl SortStrategy for CheckpointSorter {
    fn name(&self) -> &'static str {
        "checkpoint"
    }

    fn plan(&self, batch: &[SourceImage], opts: &SortOptions) -> Result<Vec<OperationPlan>> {
        let mut plans = Vec::with_capacity(batch.len());
        for src in batch {
            let key = classify::checkpoint_key(&src.metadata);
            let mut folder = opts.destination.join(key.as_str());
            if self.nested_lora {
                let lora_key = classify::lora_stack_key(&src.metadata);
                folder = folder.join(lora_key.as_str());
            }
            plans.push(OperationPlan {
                source_image: src.record.path.clone(),
                source_sidecar: src.record.sidecar_path.clone(),
                destination_folder: folder,
                destination_image_name: src.record.file_name(),
                mode: opts.mode,
            });
        }
        Ok(plans)
    }
}
