//! Dominant-color analysis for pixel-based sorting.
//!
//! The one service that decodes pixel data. Images are downsampled, pixels
//! are quantized and counted, and the most frequent color is classified
//! into a fixed set of named buckets via HSV.

use crate::{Error, Result};
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Named color buckets, in preview display order.
pub const COLOR_BUCKETS: [&str; 11] = [
    "red", "orange", "yellow", "green", "blue", "purple", "pink", "brown", "black", "white",
    "gray",
];

/// Representative RGB per bucket, used for the preview image.
const BUCKET_SWATCHES: [(&str, [u8; 3]); 11] = [
    ("red", [220, 20, 60]),
    ("orange", [255, 140, 0]),
    ("yellow", [255, 215, 0]),
    ("green", [34, 139, 34]),
    ("blue", [30, 144, 255]),
    ("purple", [148, 0, 211]),
    ("pink", [255, 20, 147]),
    ("brown", [139, 69, 19]),
    ("black", [25, 25, 25]),
    ("white", [245, 245, 245]),
    ("gray", [128, 128, 128]),
];

/// Edge length images are downsampled to before counting.
const SAMPLE_SIZE: u32 = 150;

/// Quantization step applied to each channel to group near-identical colors.
const QUANT_STEP: u8 = 16;

/// Tuning knobs for dominant-color analysis.
#[derive(Debug, Clone)]
pub struct ColorOptions {
    /// Pixels darker than this (mean channel brightness, 0..1) are ignored
    /// when counting so shadows do not skew the dominant color.
    pub dark_pixel_cutoff: f32,
    /// Images whose overall mean brightness falls below this classify as
    /// `black` regardless of hue.
    pub black_override: f32,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            dark_pixel_cutoff: 0.10,
            black_override: 0.08,
        }
    }
}

/// Determine the dominant color bucket of an image.
pub fn dominant_color(path: &Path, opts: &ColorOptions) -> Result<&'static str> {
    let decoded = image::open(path).map_err(|err| Error::ImageDecode {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let small = decoded.thumbnail(SAMPLE_SIZE, SAMPLE_SIZE).to_rgb8();
    Ok(dominant_of_pixels(&small, opts))
}

fn dominant_of_pixels(img: &RgbImage, opts: &ColorOptions) -> &'static str {
    let mut counts: HashMap<(u8, u8, u8), u32> = HashMap::new();
    let mut brightness_sum = 0f64;
    let mut pixel_count = 0u64;

    for Rgb([r, g, b]) in img.pixels() {
        let brightness = (f32::from(*r) + f32::from(*g) + f32::from(*b)) / (3.0 * 255.0);
        brightness_sum += f64::from(brightness);
        pixel_count += 1;

        if brightness > opts.dark_pixel_cutoff {
            let quantized = (
                r / QUANT_STEP * QUANT_STEP,
                g / QUANT_STEP * QUANT_STEP,
                b / QUANT_STEP * QUANT_STEP,
            );
            *counts.entry(quantized).or_insert(0) += 1;
        }
    }

    if pixel_count == 0 {
        return "gray";
    }

    let mean_brightness = (brightness_sum / pixel_count as f64) as f32;
    if mean_brightness < opts.black_override {
        return "black";
    }

    // Ties break on the darker quantized color so the pick is deterministic
    let dominant = counts
        .into_iter()
        .max_by_key(|((r, g, b), count)| {
            (
                *count,
                std::cmp::Reverse(u32::from(*r) + u32::from(*g) + u32::from(*b)),
            )
        })
        .map(|(rgb, _)| rgb);

    match dominant {
        Some((r, g, b)) => classify_rgb(r, g, b),
        None => "black", // Every pixel below the dark cutoff
    }
}

/// Classify one RGB color into a named bucket via HSV.
#[must_use]
pub fn classify_rgb(r: u8, g: u8, b: u8) -> &'static str {
    let (h, s, v) = rgb_to_hsv(r, g, b);

    // Grayscale band first
    if s < 0.15 {
        if v < 0.10 {
            return "black";
        }
        if v > 0.85 {
            return "white";
        }
        return "gray";
    }

    let hue = h * 360.0;

    // Muted dark oranges read as brown
    if (15.0..50.0).contains(&hue) && v < 0.55 && s < 0.75 {
        return "brown";
    }

    if !(15.0..345.0).contains(&hue) {
        "red"
    } else if hue < 45.0 {
        "orange"
    } else if hue < 75.0 {
        "yellow"
    } else if hue < 150.0 {
        "green"
    } else if hue < 250.0 {
        "blue"
    } else if hue < 290.0 {
        "purple"
    } else {
        "pink"
    }
}

/// RGB (0..255) to HSV (h, s, v each 0..1).
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        (((g - b) / delta).rem_euclid(6.0)) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    (h, s, v)
}

/// Render a small bar-chart PNG summarizing bucket counts.
///
/// One column per bucket that received images, column height proportional
/// to its share, drawn in the bucket's representative color.
pub fn write_preview(dir: &Path, counts: &HashMap<&'static str, usize>) -> Result<PathBuf> {
    const COLUMN_WIDTH: u32 = 40;
    const HEIGHT: u32 = 120;

    std::fs::create_dir_all(dir)?;

    let total: usize = counts.values().sum();
    let active: Vec<(&str, [u8; 3], usize)> = BUCKET_SWATCHES
        .iter()
        .filter_map(|(name, rgb)| counts.get(name).map(|count| (*name, *rgb, *count)))
        .collect();

    let columns = active.len().max(1) as u32;
    let mut img = RgbImage::from_pixel(columns * COLUMN_WIDTH, HEIGHT, Rgb([30, 30, 30]));

    if total > 0 {
        for (i, (_name, rgb, count)) in active.iter().enumerate() {
            let share = *count as f32 / total as f32;
            let bar_height = ((share * f32::from(HEIGHT as u16)).round() as u32).clamp(2, HEIGHT);
            let x0 = i as u32 * COLUMN_WIDTH;
            for x in x0 + 2..x0 + COLUMN_WIDTH - 2 {
                for y in HEIGHT - bar_height..HEIGHT {
                    img.put_pixel(x, y, Rgb(*rgb));
                }
            }
        }
    }

    let path = dir.join("color_preview.png");
    img.save(&path).map_err(|err| Error::ImageDecode {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(path)
}
