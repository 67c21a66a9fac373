//! Filter images by search terms over their metadata.
//!
//! Unlike the grouping sorters, this one filters: matching images land
//! directly in the destination directory, non-matching images produce no
//! plan and their originals are left untouched.

use super::SortStrategy;
use crate::models::{OperationPlan, SourceImage, WorkflowMetadata};
use crate::{Error, Result, SortOptions};

/// Combination semantics for multiple search terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// At least one term matches.
    #[default]
    Any,
    /// Every term must match.
    All,
    /// A term equals an entire field.
    Exact,
}

impl MatchMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Any => "any",
            MatchMode::All => "all",
            MatchMode::Exact => "exact",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "any" => Some(MatchMode::Any),
            "all" => Some(MatchMode::All),
            "exact" => Some(MatchMode::Exact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetadataSearchSorter {
    pub terms: Vec<String>,
    pub mode: MatchMode,
    pub case_sensitive: bool,
}

impl MetadataSearchSorter {
    pub fn new(terms: Vec<String>, mode: MatchMode, case_sensitive: bool) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::InvalidInput(
                "metadata search requires at least one term".to_string(),
            ));
        }
        Ok(Self {
            terms,
            mode,
            case_sensitive,
        })
    }

    /// Evaluate the configured terms against one metadata record.
    #[must_use]
    pub fn matches(&self, meta: &WorkflowMetadata) -> bool {
        let haystacks = self.haystacks(meta);
        let term_hits = |term: &String| {
            let needle = self.fold(term);
            match self.mode {
                MatchMode::Exact => haystacks.iter().any(|field| *field == needle),
                MatchMode::Any | MatchMode::All => {
                    haystacks.iter().any(|field| field.contains(&needle))
                }
            }
        };
        match self.mode {
            MatchMode::Any => self.terms.iter().any(term_hits),
            MatchMode::All | MatchMode::Exact => self.terms.iter().all(term_hits),
        }
    }

    /// Searchable fields: prompts, checkpoint, LoRA names, sampler settings.
    fn haystacks(&self, meta: &WorkflowMetadata) -> Vec<String> {
        let mut fields = vec![
            self.fold(&meta.positive_prompt),
            self.fold(&meta.negative_prompt),
            self.fold(&meta.checkpoint_name),
        ];
        for lora in &meta.lora_stack {
            fields.push(self.fold(&lora.name));
        }
        for (name, value) in &meta.sampler_settings {
            fields.push(self.fold(&format!("{name}={value}")));
        }
        fields
    }

    fn fold(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }
}

impl SortStrategy for MetadataSearchSorter {
    fn name(&self) -> &'static str {
        "search"
    }

    fn plan(&self, batch: &[SourceImage], opts: &SortOptions) -> Result<Vec<OperationPlan>> {
        let mut plans = Vec::new();
        for src in batch {
            if !self.matches(&src.metadata) {
                continue;
            }
            plans.push(OperationPlan {
                source_image: src.record.path.clone(),
                source_sidecar: src.record.sidecar_path.clone(),
                destination_folder: opts.destination.clone(),
                destination_image_name: src.record.file_name(),
                mode: opts.mode,
            });
        }
        log::info!(
            "search matched {} of {} image(s)",
            plans.len(),
            batch.len()
        );
        Ok(plans)
    }
}
