//! Integration tests for the LoRA-stack sorter

use crate::fixtures::{workflow_json, write_workflow_png};
use imgsort::sorters::LoraStackSorter;
use imgsort::{SortOptions, run_batch};
use std::fs;
use tempfile::TempDir;

#[test]
fn same_stack_different_order_shares_a_folder() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("a.png"),
        &workflow_json(
            "modelA.safetensors",
            &[("DetailTweaker.safetensors", 0.8), ("FilmGrain.safetensors", 0.5)],
        ),
    )
    .unwrap();
    write_workflow_png(
        &source.join("b.png"),
        &workflow_json(
            "modelB.safetensors",
            &[("FilmGrain.safetensors", 0.4), ("DetailTweaker.safetensors", 1.0)],
        ),
    )
    .unwrap();

    let mut opts = SortOptions::new(source, dest.clone());
    opts.no_log_file = true;
    let report = run_batch(&LoraStackSorter, &opts, None, None).unwrap();

    // Checkpoint and strengths differ; the stack signature does not
    assert_eq!(report.succeeded, 2);
    let folder = dest.join("DetailTweaker+FilmGrain");
    assert!(folder.join("a.png").exists());
    assert!(folder.join("b.png").exists());
}

#[test]
fn empty_stack_buckets_as_no_loras() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("plain.png"),
        &workflow_json("modelA.safetensors", &[]),
    )
    .unwrap();

    let mut opts = SortOptions::new(source, dest.clone());
    opts.no_log_file = true;
    run_batch(&LoraStackSorter, &opts, None, None).unwrap();

    assert!(dest.join("no_loras/plain.png").exists());
}

#[test]
fn single_lora_folder_named_after_it() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("out");
    fs::create_dir(&source).unwrap();

    write_workflow_png(
        &source.join("styled.png"),
        &workflow_json("modelA.safetensors", &[("loras/FilmGrain.safetensors", 0.5)]),
    )
    .unwrap();

    let mut opts = SortOptions::new(source, dest.clone());
    opts.no_log_file = true;
    run_batch(&LoraStackSorter, &opts, None, None).unwrap();

    // Path prefix and extension are stripped from the folder name
    assert!(dest.join("FilmGrain/styled.png").exists());
}
