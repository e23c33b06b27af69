//! catsdoc — build a documentation graph from LuaCATS-annotated Lua files.
//!
//! Two modes:
//!
//! - **stdin mode**: `catsdoc < library.lua` prints JSON to stdout
//! - **file mode**: `catsdoc -o docs/api library/ extra/*.lua` writes `docs/api/doc.json`

use anyhow::{bail, Context, Result};
use catsdoc::config::Config;
use catsdoc::diagnostics::{Diagnostic, Severity};
use catsdoc::{logging, parser, Documentation};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Name of the JSON file written into the output directory.
const OUTPUT_FILE: &str = "doc.json";

#[derive(Parser)]
#[command(
    name = "catsdoc",
    version,
    about = "Build a documentation graph from LuaCATS-annotated Lua files"
)]
struct Cli {
    /// Input files, directories or glob patterns. If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also write catsdoc.log into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Type name defined outside the processed files.
    /// Can be specified multiple times.
    #[arg(long = "known-type", value_name = "NAME")]
    known_types: Vec<String>,

    /// Exit with failure on warnings too
    #[arg(long)]
    deny_warnings: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_dir.as_deref())?;

    let config = Config {
        known_types: cli.known_types.clone(),
        deny_warnings: cli.deny_warnings,
        ..Default::default()
    };

    let doc = if cli.files.is_empty() {
        stdin_mode(&config)?
    } else {
        file_mode(&cli, &config)?
    };

    report(&doc.diagnostics);
    if config.fails(&doc.diagnostics) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// stdin mode: read one Lua file from stdin, print JSON to stdout.
fn stdin_mode(config: &Config) -> Result<Documentation> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let files = vec![parser::parse_source("<stdin>", &input, config)];
    let doc = Documentation::build(&files, config);
    print!("{}", doc.to_json()?);
    Ok(doc)
}

/// file mode: process every input file, write doc.json to the output directory.
fn file_mode(cli: &Cli, config: &Config) -> Result<Documentation> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    let inputs = expand_inputs(&cli.files)?;
    if inputs.is_empty() {
        bail!("no Lua files found");
    }
    info!(files = inputs.len(), "scanning");

    let files = catsdoc::load_files(&inputs, config);
    let doc = Documentation::build(&files, config);

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;
    let out_path = output_dir.join(OUTPUT_FILE);
    doc.write_json(&out_path)?;
    info!(
        entities = doc.model.len(),
        path = %out_path.display(),
        "wrote documentation"
    );
    Ok(doc)
}

/// Log every diagnostic, then a summary line.
fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => warn!("{}", diagnostic),
            Severity::Error => error!("{}", diagnostic),
        }
    }
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    if errors + warnings > 0 {
        info!("{} error(s), {} warning(s)", errors, warnings);
    }
}

/// File extension of Lua sources.
const LUA_EXTENSION: &str = "lua";

/// Expand files, directories (recursively) and glob patterns into a
/// sorted, de-duplicated list of paths.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let pattern = if path.is_dir() {
            format!("{}/**/*.{}", pattern.trim_end_matches('/'), LUA_EXTENSION)
        } else {
            pattern.clone()
        };
        let matches: Vec<_> = glob::glob(&pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
