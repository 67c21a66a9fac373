//! Image Sorter (imgsort) - Main binary entry point

use imgsort::cli::args::{CliArgs, ColorArgs, Command, MetaArgs, SearchArgs, SortArgs, parse_args};
use imgsort::cli::output::{clear_progress, format_json, print_progress, print_summary};
use imgsort::models::{OperationMode, RunReport};
use imgsort::services::color::ColorOptions;
use imgsort::sorters::{
    CheckpointSorter, ColorSorter, ImageFlattener, LoraStackSorter, MatchMode,
    MetadataOnlyOptions, MetadataSearchSorter, SortStrategy, generate_sidecars,
};
use imgsort::{SortOptions, run_batch};
use std::path::PathBuf;
use std::process;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug imgsort checkpoint /path --dest /sorted
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-v" => {
            print_version();
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    let exit_code = run_command(&cli_args);
    process::exit(exit_code);
}

fn run_command(cli_args: &CliArgs) -> i32 {
    match &cli_args.command {
        Command::Checkpoint(args) => {
            let sorter = CheckpointSorter {
                nested_lora: args.nested_lora,
            };
            handle_sort(&sorter, args, "checkpoint_sorted")
        }
        Command::Lora(args) => handle_sort(&LoraStackSorter, args, "lora_sorted"),
        Command::Search(args) => handle_search(args),
        Command::Color(args) => handle_color(args),
        Command::Flatten(args) => {
            let sorter = ImageFlattener {
                remove_empty_dirs: !args.keep_empty_dirs,
            };
            handle_sort(&sorter, args, "flattened")
        }
        Command::Meta(args) => handle_meta(args),
    }
}

fn handle_search(args: &SearchArgs) -> i32 {
    let mode = match MatchMode::from_label(&args.match_mode) {
        Some(mode) => mode,
        None => {
            eprintln!(
                "Invalid match mode: {}. Use 'any', 'all', or 'exact'",
                args.match_mode
            );
            return 2;
        }
    };
    let sorter = match MetadataSearchSorter::new(args.terms.clone(), mode, args.case_sensitive) {
        Ok(sorter) => sorter,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };
    handle_sort(&sorter, &args.base, "search_results")
}

fn handle_color(args: &ColorArgs) -> i32 {
    let mut options = ColorOptions::default();
    if let Some(threshold) = args.dark_threshold {
        options.black_override = threshold;
    }
    let sorter = ColorSorter {
        options,
        preview: args.preview,
    };
    handle_sort(&sorter, &args.base, "color_sorted")
}

/// Shared driver for the sorting subcommands. `default_dest` names the
/// folder created inside the source when --dest is not given.
fn handle_sort(strategy: &dyn SortStrategy, args: &SortArgs, default_dest: &str) -> i32 {
    let source = PathBuf::from(&args.source);
    let destination = match &args.dest {
        Some(dest) => PathBuf::from(dest),
        None => source.join(default_dest),
    };

    let opts = SortOptions {
        source,
        destination,
        mode: if args.move_files {
            OperationMode::Move
        } else {
            OperationMode::Copy
        },
        write_sidecars: args.sidecars,
        no_log_file: false,
    };

    let progress = |event: &imgsort::models::ProgressEvent| print_progress(event);
    let progress_ref: Option<imgsort::sorters::ProgressFn<'_>> = if args.quiet {
        None
    } else {
        Some(&progress)
    };

    match run_batch(strategy, &opts, progress_ref, None) {
        Ok(report) => finish(&report, args.quiet, args.json),
        Err(e) => {
            if !args.quiet {
                clear_progress();
            }
            eprintln!("Error: {e}");
            1
        }
    }
}

fn handle_meta(args: &MetaArgs) -> i32 {
    let opts = MetadataOnlyOptions {
        source: PathBuf::from(&args.source),
        output_dir: args.output.as_ref().map(PathBuf::from),
        overwrite: args.overwrite,
        recursive: args.recursive,
        no_log_file: false,
    };

    let progress = |event: &imgsort::models::ProgressEvent| print_progress(event);
    let progress_ref: Option<imgsort::sorters::ProgressFn<'_>> = if args.quiet {
        None
    } else {
        Some(&progress)
    };

    match generate_sidecars(&opts, progress_ref, None) {
        Ok(report) => finish(&report, args.quiet, args.json),
        Err(e) => {
            if !args.quiet {
                clear_progress();
            }
            eprintln!("Error: {e}");
            1
        }
    }
}

fn finish(report: &RunReport, quiet: bool, json: bool) -> i32 {
    if !quiet {
        clear_progress();
    }
    if json {
        println!("{}", format_json(report));
    } else {
        print_summary(report);
    }
    if report.failed > 0 { 1 } else { 0 }
}

fn print_help() {
    println!("Image Sorter (imgsort) - Organize AI-generated images by embedded metadata");
    println!();
    println!("USAGE:");
    println!("    imgsort <COMMAND> <SOURCE_DIR> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    checkpoint   Sort by base checkpoint model");
    println!("    lora         Sort by LoRA stack signature (checkpoint ignored)");
    println!("    search       Copy/move images whose metadata matches search terms");
    println!("    color        Sort by dominant color (decodes pixels)");
    println!("    flatten      Re-home images from nested folders into one directory");
    println!("    meta         Generate metadata sidecar files, move nothing");
    println!();
    println!("COMMON OPTIONS:");
    println!("    --dest <DIR>         Destination directory (default: inside source)");
    println!("    --move               Move files instead of copying");
    println!("    --sidecars           Write extracted-metadata sidecars at destination");
    println!("    --quiet              Suppress progress output");
    println!("    --json               Print the final summary as JSON");
    println!();
    println!("CHECKPOINT OPTIONS:");
    println!("    --nested-lora        Sub-group by LoRA stack inside checkpoint folders");
    println!();
    println!("SEARCH OPTIONS:");
    println!("    --term <TEXT>        Search term (repeatable)");
    println!("    --match <MODE>       any | all | exact (default: any)");
    println!("    --case-sensitive     Match case exactly");
    println!();
    println!("COLOR OPTIONS:");
    println!("    --preview            Write a color distribution preview image");
    println!("    --dark-threshold <V> Brightness below which images bucket as black (0-1)");
    println!();
    println!("FLATTEN OPTIONS:");
    println!("    --keep-empty-dirs    Do not remove emptied source directories");
    println!();
    println!("META OPTIONS:");
    println!("    --output <DIR>       Write sidecars into this directory");
    println!("    --overwrite          Replace existing sidecar files");
    println!("    --recursive          Include subdirectories");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    -h, --help           Show this help message");
    println!("    -v, --version        Show version information");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_DATE: &str = env!("GIT_DATE");
    const BUILD_TARGET: &str = env!("BUILD_TARGET");

    println!("imgsort {VERSION}");
    println!("Commit: {GIT_HASH} ({GIT_DATE})");
    println!("Target: {BUILD_TARGET}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
