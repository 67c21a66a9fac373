//! Collision handling: destination name suffixes and sidecar pairing

use crate::fixtures::{workflow_json, write_workflow_png};
use imgsort::models::OperationMode;
use imgsort::sorters::CheckpointSorter;
use imgsort::{SortOptions, run_batch};
use std::fs;
use tempfile::TempDir;

fn opts(source: &std::path::Path, dest: &std::path::Path) -> SortOptions {
    let mut opts = SortOptions::new(source.to_path_buf(), dest.to_path_buf());
    opts.no_log_file = true;
    opts
}

#[test]
fn rerun_in_copy_mode_appends_suffixes() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("image.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();

    let opts = opts(&source, &dest);
    run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();
    run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();
    run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();

    let folder = dest.join("modelA");
    assert!(folder.join("image.png").exists());
    assert!(folder.join("image_1.png").exists());
    assert!(folder.join("image_2.png").exists());
    assert!(!folder.join("image_3.png").exists());
}

#[test]
fn sidecar_travels_with_its_image() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("shot.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();
    fs::write(source.join("shot.txt"), "prompt notes").unwrap();

    let mut opts = opts(&source, &dest);
    opts.mode = OperationMode::Move;
    run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();

    let folder = dest.join("modelA");
    assert!(folder.join("shot.png").exists());
    assert_eq!(
        fs::read_to_string(folder.join("shot.txt")).unwrap(),
        "prompt notes"
    );
    assert!(!source.join("shot.png").exists());
    assert!(!source.join("shot.txt").exists());
}

#[test]
fn suffixed_image_keeps_matching_sidecar_name() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("shot.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();
    fs::write(source.join("shot.txt"), "first").unwrap();

    // Occupy the natural slot so the pair needs a suffix
    let folder = dest.join("modelA");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("shot.png"), "occupied").unwrap();

    let opts = opts(&source, &dest);
    run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();

    assert!(folder.join("shot_1.png").exists());
    assert_eq!(fs::read_to_string(folder.join("shot_1.txt")).unwrap(), "first");
    // The occupying file is untouched
    assert_eq!(fs::read_to_string(folder.join("shot.png")).unwrap(), "occupied");
}

#[test]
fn occupied_sidecar_slot_shifts_the_whole_pair() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("shot.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();
    fs::write(source.join("shot.txt"), "pair").unwrap();

    // Image slot is free but the sidecar slot is taken; the pair must
    // move to the next suffix together rather than split.
    let folder = dest.join("modelA");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("shot.txt"), "someone else's notes").unwrap();

    let opts = opts(&source, &dest);
    run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();

    assert!(!folder.join("shot.png").exists());
    assert!(folder.join("shot_1.png").exists());
    assert_eq!(fs::read_to_string(folder.join("shot_1.txt")).unwrap(), "pair");
    assert_eq!(
        fs::read_to_string(folder.join("shot.txt")).unwrap(),
        "someone else's notes"
    );
}
