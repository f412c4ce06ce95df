//! The generator subcommands.

use anyhow::{Context, Result, bail};
use clap::Args;
use curryforge::{FunctionSummary, Generator};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "curryforge.yaml";

/// Arguments for the generate subcommand
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Configuration file
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the configured output directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Render without writing; print what would be written
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the check subcommand
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration file
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the configured output directory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Arguments for the list subcommand
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Configuration file
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

fn load(config: &Path) -> Result<Generator> {
    Generator::from_config_file(config)
        .with_context(|| format!("Failed to load configuration {}", config.display()))
}

fn output_dir(generator: &Generator, output: Option<&PathBuf>) -> PathBuf {
    output.cloned().unwrap_or_else(|| generator.config().output.directory.clone())
}

/// Run the generate subcommand
pub fn generate(args: &GenerateArgs) -> Result<()> {
    let generator = load(&args.config)?;
    let output = output_dir(&generator, args.output.as_ref());

    if args.dry_run {
        let artifacts = generator.render().context("Failed to render artifacts")?;
        for artifact in &artifacts {
            println!(
                "would write {} ({} bytes)",
                output.join(&artifact.file_name).display(),
                artifact.contents.len()
            );
        }
        return Ok(());
    }

    let written = generator
        .generate(&output)
        .with_context(|| format!("Failed to generate into {}", output.display()))?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Run the check subcommand
pub fn check(args: &CheckArgs) -> Result<()> {
    let generator = load(&args.config)?;
    let output = output_dir(&generator, args.output.as_ref());

    let report = generator
        .check(&output)
        .with_context(|| format!("Failed to check {}", output.display()))?;

    for path in &report.stale {
        println!("stale    {}", path.display());
    }
    for path in &report.missing {
        println!("missing  {}", path.display());
    }

    if !report.is_clean() {
        bail!(
            "{} artifact(s) out of date; run `cargo xtask generate`",
            report.stale.len() + report.missing.len()
        );
    }
    println!("all artifacts up to date");
    Ok(())
}

/// Run the list subcommand
pub fn list(args: &ListArgs) -> Result<()> {
    let generator = load(&args.config)?;
    let summaries = generator
        .describe()
        .context("Failed to read template functions")?;

    let width = summaries
        .iter()
        .map(|summary| summary.name.len())
        .max()
        .unwrap_or(0);
    for summary in &summaries {
        println!("{:width$}  {}", summary.name, describe(summary));
    }
    Ok(())
}

fn describe(summary: &FunctionSummary) -> String {
    let mut flags = vec![format!("arity={}", summary.arity)];
    if summary.variadic {
        flags.push("variadic".to_string());
    }
    if let Some(collection) = &summary.collection_argument {
        flags.push(format!("collection=${collection}"));
    }
    if summary.deprecated {
        flags.push("deprecated".to_string());
    }
    if !summary.return_types.is_empty() {
        flags.push(format!("returns={}", summary.return_types.join("|")));
    }
    if !summary.inner_params.is_empty() {
        flags.push(format!("inner=({})", summary.inner_params.join(", ")));
    }
    flags.join(" ")
}
