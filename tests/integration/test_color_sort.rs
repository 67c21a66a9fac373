//! Integration tests for the dominant-color sorter

use crate::fixtures::{write_color_png, write_plain_png};
use imgsort::sorters::ColorSorter;
use imgsort::{SortOptions, run_batch};
use std::fs;
use tempfile::TempDir;

#[test]
fn solid_images_land_in_their_color_buckets() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_color_png(&source.join("r.png"), [220, 20, 20]).unwrap();
    write_color_png(&source.join("g.png"), [30, 200, 40]).unwrap();
    write_color_png(&source.join("b.png"), [20, 40, 220]).unwrap();

    let mut opts = SortOptions::new(source, dest.clone());
    opts.no_log_file = true;
    let report = run_batch(&ColorSorter::default(), &opts, None, None).unwrap();

    assert_eq!(report.succeeded, 3);
    // Pixel-only strategy: nothing counts as missing metadata
    assert_eq!(report.metadata_missing, 0);
    assert!(dest.join("red/r.png").exists());
    assert!(dest.join("green/g.png").exists());
    assert!(dest.join("blue/b.png").exists());
}

#[test]
fn undecodable_image_falls_back_to_gray() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    // Valid PNG container, zeroed IHDR: passes enumeration, fails decode
    write_plain_png(&source.join("broken.png")).unwrap();

    let mut opts = SortOptions::new(source, dest.clone());
    opts.no_log_file = true;
    let report = run_batch(&ColorSorter::default(), &opts, None, None).unwrap();

    assert_eq!(report.succeeded, 1);
    assert!(dest.join("gray/broken.png").exists());
}

#[test]
fn preview_image_written_when_requested() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_color_png(&source.join("r.png"), [220, 20, 20]).unwrap();
    write_color_png(&source.join("b.png"), [20, 40, 220]).unwrap();

    let mut opts = SortOptions::new(source, dest.clone());
    opts.no_log_file = true;
    let sorter = ColorSorter {
        preview: true,
        ..ColorSorter::default()
    };
    run_batch(&sorter, &opts, None, None).unwrap();

    let preview = dest.join("color_preview.png");
    assert!(preview.exists());
    assert!(image::open(&preview).is_ok());
}
