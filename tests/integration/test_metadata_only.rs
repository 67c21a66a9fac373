//! Integration tests for metadata-only sidecar generation

use crate::fixtures::{rich_workflow_json, write_plain_png, write_workflow_png};
use imgsort::sorters::{MetadataOnlyOptions, generate_sidecars};
use std::fs;
use tempfile::TempDir;

fn opts(source: &std::path::Path) -> MetadataOnlyOptions {
    let mut opts = MetadataOnlyOptions::new(source.to_path_buf());
    opts.no_log_file = true;
    opts
}

#[test]
fn sidecars_appear_next_to_images_and_nothing_moves() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    fs::create_dir(&source).unwrap();

    let image = source.join("castle.png");
    write_workflow_png(
        &image,
        &rich_workflow_json("modelA.safetensors", "a castle on a hill", "blurry"),
    )
    .unwrap();

    let report = generate_sidecars(&opts(&source), None, None).unwrap();

    assert_eq!(report.succeeded, 1);
    assert!(image.exists());
    let text = fs::read_to_string(source.join("castle.txt")).unwrap();
    assert!(text.contains("modelA.safetensors"));
    assert!(text.contains("positive: a castle on a hill"));
    assert!(text.contains("sampler_name: euler"));
}

#[test]
fn images_without_metadata_are_skipped() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    fs::create_dir(&source).unwrap();

    write_plain_png(&source.join("bare.png")).unwrap();

    let report = generate_sidecars(&opts(&source), None, None).unwrap();

    assert_eq!(report.succeeded, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.metadata_missing, 1);
    assert!(!source.join("bare.txt").exists());
}

#[test]
fn existing_sidecar_is_preserved_unless_overwrite() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("castle.png"),
        &rich_workflow_json("modelA.safetensors", "a castle", "blurry"),
    )
    .unwrap();
    fs::write(source.join("castle.txt"), "hand-written notes").unwrap();

    let report = generate_sidecars(&opts(&source), None, None).unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(
        fs::read_to_string(source.join("castle.txt")).unwrap(),
        "hand-written notes"
    );

    let mut overwrite = opts(&source);
    overwrite.overwrite = true;
    let report = generate_sidecars(&overwrite, None, None).unwrap();
    assert_eq!(report.succeeded, 1);
    assert!(
        fs::read_to_string(source.join("castle.txt"))
            .unwrap()
            .contains("modelA.safetensors")
    );
}

#[test]
fn output_dir_mirrors_source_structure() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let output = temp.path().join("meta");
    fs::create_dir_all(source.join("batch1")).unwrap();

    write_workflow_png(
        &source.join("batch1/img.png"),
        &rich_workflow_json("modelA.safetensors", "a castle", "blurry"),
    )
    .unwrap();

    let mut opts = opts(&source);
    opts.output_dir = Some(output.clone());
    opts.recursive = true;
    let report = generate_sidecars(&opts, None, None).unwrap();

    assert_eq!(report.succeeded, 1);
    assert!(output.join("batch1/img.txt").exists());
    assert!(!source.join("batch1/img.txt").exists());
}
