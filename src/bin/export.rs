//! Petstore Export CLI
//!
//! Renders the registry as TypeScript declarations, a JSON Schema document or
//! the raw JSON catalog. With `--check`, compares a previously generated file
//! against a fresh rendering and fails on drift.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use petstore_schemas::codegen::{detect_drift, generate};
use petstore_schemas::{petstore, PetstoreConfig, Target};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "petstore-export")]
#[command(about = "Export the Petstore schema registry")]
struct Cli {
    /// Output target: typescript, json-schema or json (defaults to export.target)
    #[arg(short, long)]
    target: Option<Target>,

    /// Write to this file instead of stdout
    #[arg(short, long, conflicts_with = "check")]
    output: Option<PathBuf>,

    /// Compare against an existing file; exit 1 with a diff when they differ
    #[arg(long)]
    check: Option<PathBuf>,

    /// Spaces per indentation level
    #[arg(long)]
    indent: Option<usize>,

    /// Leave descriptions out of the output
    #[arg(long)]
    no_descriptions: bool,

    /// Single-line JSON (JSON targets only)
    #[arg(long)]
    compact: bool,

    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PetstoreConfig::load_from(cli.config.as_deref())?;
    let registry = petstore()?;

    let target = cli.target.unwrap_or(config.export.target);
    let mut options = config.export.render_options();
    if let Some(indent) = cli.indent {
        options.indent = indent;
    }
    if cli.no_descriptions {
        options.descriptions = false;
    }
    if cli.compact {
        options.compact = true;
    }

    let output = generate(&registry, target, &options)?;

    if let Some(path) = cli.check {
        let on_disk = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let label = path.display().to_string();

        match detect_drift(&on_disk, &output.code, &label) {
            None => {
                println!("✅ {} is up to date ({})", label, target);
            }
            Some(drift) => {
                println!("❌ {} has drifted from the registry: {}", label, drift.summary());
                println!();
                print!("{}", drift.diff);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    match cli.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &output.code)
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "✅ Wrote {} record type(s) as {} to {}",
                output.type_count,
                target,
                path.display()
            );
        }
        None => print!("{}", output.code),
    }

    Ok(())
}
