//! Session log file creation and cooperative cancellation

use crate::fixtures::{workflow_json, write_workflow_png};
use imgsort::sorters::CheckpointSorter;
use imgsort::{SortOptions, run_batch};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

#[test]
fn log_file_lands_in_destination_with_outcome_lines() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("one.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();

    let opts = SortOptions::new(source, dest.clone());
    let report = run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();

    let log_path = report.log_path.expect("log file expected");
    assert!(Path::new(&log_path).starts_with(&dest));
    assert!(
        Path::new(&log_path)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("sort_session_")
    );

    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("OK one.png"));
    assert!(content.contains("# --- summary ---"));
    assert!(content.contains("# succeeded:        1"));
}

#[test]
fn no_log_file_option_keeps_the_run_in_memory() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("one.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();

    let mut opts = SortOptions::new(source, dest.clone());
    opts.no_log_file = true;
    let report = run_batch(&CheckpointSorter::default(), &opts, None, None).unwrap();

    assert!(report.log_path.is_none());
    let logs: Vec<_> = fs::read_dir(&dest)
        .unwrap()
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "log"))
        .collect();
    assert!(logs.is_empty());
}

#[test]
fn pre_set_cancel_flag_stops_before_any_file_moves() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("one.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();

    let mut opts = SortOptions::new(source.clone(), dest.clone());
    opts.no_log_file = true;
    let cancel = AtomicBool::new(true);
    let report = run_batch(&CheckpointSorter::default(), &opts, None, Some(&cancel)).unwrap();

    assert!(report.cancelled);
    assert_eq!(report.succeeded, 0);
    assert!(source.join("one.png").exists());
    assert!(!dest.join("modelA").exists());
}
