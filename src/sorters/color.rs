//! Sort images into folders by dominant color.
//!
//! The only strategy that decodes pixel data; embedded metadata is not
//! consulted at all.

use super::SortStrategy;
use crate::models::{OperationPlan, SourceImage};
use crate::services::color::{self, ColorOptions};
use crate::{Result, SortOptions};
use std::collections::HashMap;

pub struct ColorSorter {
    pub options: ColorOptions,
    /// Write a `color_preview.png` bar chart of the bucket distribution
    /// into the destination directory.
    pub preview: bool,
}

impl Default for ColorSorter {
    fn default() -> Self {
        Self {
            options: ColorOptions::default(),
            preview: false,
        }
    }
}

impl SortStrategy for ColorSorter {
    fn name(&self) -> &'static str {
        "color"
    }

    fn needs_metadata(&self) -> bool {
        false
    }

    fn plan(&self, batch: &[SourceImage], opts: &SortOptions) -> Result<Vec<OperationPlan>> {
        let mut plans = Vec::with_capacity(batch.len());
        let mut counts: HashMap<&'static str, usize> = HashMap::new();

        for src in batch {
            let bucket = match color::dominant_color(&src.record.path, &self.options) {
                Ok(bucket) => bucket,
                Err(err) => {
                    // Undecodable images still sort, into the neutral bucket
                    log::warn!("{err}");
                    "gray"
                }
            };
            *counts.entry(bucket).or_insert(0) += 1;
            plans.push(OperationPlan {
                source_image: src.record.path.clone(),
                source_sidecar: src.record.sidecar_path.clone(),
                destination_folder: opts.destination.join(bucket),
                destination_image_name: src.record.file_name(),
                mode: opts.mode,
            });
        }

        if self.preview && !plans.is_empty() {
            match color::write_preview(&opts.destination, &counts) {
                Ok(path) => log::info!("Color preview written to {}", path.display()),
                Err(err) => log::warn!("Color preview failed: {err}"),
            }
        }

        Ok(plans)
    }
}
