//! CLI argument parsing

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Checkpoint(SortArgs),
    Lora(SortArgs),
    Search(SearchArgs),
    Color(ColorArgs),
    Flatten(SortArgs),
    Meta(MetaArgs),
}

/// Flags shared by the sorting subcommands.
#[derive(Debug, Clone)]
pub struct SortArgs {
    pub source: String,
    pub dest: Option<String>,
    pub move_files: bool,
    pub sidecars: bool,
    pub nested_lora: bool,
    pub keep_empty_dirs: bool,
    pub quiet: bool,
    pub json: bool,
}

impl Default for SortArgs {
    fn default() -> Self {
        Self {
            source: String::new(),
            dest: None,
            move_files: false,
            sidecars: false,
            nested_lora: false,
            keep_empty_dirs: false,
            quiet: false,
            json: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub base: SortArgs,
    pub terms: Vec<String>,
    pub match_mode: String,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone)]
pub struct ColorArgs {
    pub base: SortArgs,
    pub preview: bool,
    pub dark_threshold: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct MetaArgs {
    pub source: String,
    pub output: Option<String>,
    pub overwrite: bool,
    pub recursive: bool,
    pub quiet: bool,
    pub json: bool,
}

/// Parse command line arguments
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let command = match args[1].as_str() {
        "checkpoint" => Command::Checkpoint(parse_sort_args(&args[2..])?),
        "lora" => Command::Lora(parse_sort_args(&args[2..])?),
        "search" => Command::Search(parse_search_args(&args[2..])?),
        "color" => Command::Color(parse_color_args(&args[2..])?),
        "flatten" => Command::Flatten(parse_sort_args(&args[2..])?),
        "meta" => Command::Meta(parse_meta_args(&args[2..])?),
        other => return Err(format!("Unknown command: {other}")),
    };

    Ok(CliArgs { command })
}

fn parse_sort_args(args: &[String]) -> Result<SortArgs, String> {
    let mut sort_args = SortArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--dest" => {
                i += 1;
                if i >= args.len() {
                    return Err("--dest requires a directory".to_string());
                }
                sort_args.dest = Some(args[i].clone());
            }
            "--move" => sort_args.move_files = true,
            "--copy" => sort_args.move_files = false,
            "--sidecars" => sort_args.sidecars = true,
            "--nested-lora" => sort_args.nested_lora = true,
            "--keep-empty-dirs" => sort_args.keep_empty_dirs = true,
            "--quiet" => sort_args.quiet = true,
            "--json" => sort_args.json = true,
            arg if arg.starts_with("--") => {
                return Err(format!("Unknown option: {arg}"));
            }
            arg => {
                if !sort_args.source.is_empty() {
                    return Err(format!("Unexpected argument: {arg}"));
                }
                sort_args.source = arg.to_string();
            }
        }
        i += 1;
    }

    if sort_args.source.is_empty() {
        return Err("Source directory is required".to_string());
    }

    Ok(sort_args)
}

fn parse_search_args(args: &[String]) -> Result<SearchArgs, String> {
    let mut terms = Vec::new();
    let mut match_mode = "any".to_string();
    let mut case_sensitive = false;
    let mut rest = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--term" => {
                i += 1;
                if i >= args.len() {
                    return Err("--term requires a value".to_string());
                }
                terms.push(args[i].clone());
            }
            "--match" => {
                i += 1;
                if i >= args.len() {
                    return Err("--match requires any, all, or exact".to_string());
                }
                match_mode.clone_from(&args[i]);
            }
            "--case-sensitive" => case_sensitive = true,
            _ => rest.push(args[i].clone()),
        }
        i += 1;
    }

    if terms.is_empty() {
        return Err("search requires at least one --term".to_string());
    }

    Ok(SearchArgs {
        base: parse_sort_args(&rest)?,
        terms,
        match_mode,
        case_sensitive,
    })
}

fn parse_color_args(args: &[String]) -> Result<ColorArgs, String> {
    let mut preview = false;
    let mut dark_threshold = None;
    let mut rest = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--preview" => preview = true,
            "--dark-threshold" => {
                i += 1;
                if i >= args.len() {
                    return Err("--dark-threshold requires a value".to_string());
                }
                let value: f32 = args[i]
                    .parse()
                    .map_err(|_| "--dark-threshold must be a number".to_string())?;
                if !(0.0..=1.0).contains(&value) {
                    return Err("--dark-threshold must be between 0 and 1".to_string());
                }
                dark_threshold = Some(value);
            }
            _ => rest.push(args[i].clone()),
        }
        i += 1;
    }

    Ok(ColorArgs {
        base: parse_sort_args(&rest)?,
        preview,
        dark_threshold,
    })
}

fn parse_meta_args(args: &[String]) -> Result<MetaArgs, String> {
    let mut meta_args = MetaArgs {
        source: String::new(),
        output: None,
        overwrite: false,
        recursive: false,
        quiet: false,
        json: false,
    };
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output requires a directory".to_string());
                }
                meta_args.output = Some(args[i].clone());
            }
            "--overwrite" => meta_args.overwrite = true,
            "--recursive" => meta_args.recursive = true,
            "--quiet" => meta_args.quiet = true,
            "--json" => meta_args.json = true,
            arg if arg.starts_with("--") => {
                return Err(format!("Unknown option: {arg}"));
            }
            arg => {
                if !meta_args.source.is_empty() {
                    return Err(format!("Unexpected argument: {arg}"));
                }
                meta_args.source = arg.to_string();
            }
        }
        i += 1;
    }

    if meta_args.source.is_empty() {
        return Err("Source directory is required".to_string());
    }

    Ok(meta_args)
}
