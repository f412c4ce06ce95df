//! xtask - command-line runner for curryforge
//!
//! Usage:
//!   cargo xtask generate [--config curryforge.yaml] [--output <dir>] [--dry-run]
//!   cargo xtask check [--config curryforge.yaml] [--output <dir>]
//!   cargo xtask list [--config curryforge.yaml]

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Generates the curried PHP API, its tests and its reference")]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every artifact and write it to the output directory
    Generate(commands::GenerateArgs),
    /// Fail when an artifact on disk differs from a fresh rendering
    Check(commands::CheckArgs),
    /// Print the inferred metadata of every template function
    List(commands::ListArgs),
}

/// Logging goes to stderr; `RUST_LOG` overrides the verbosity flags.
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,curryforge=info,xtask=info".to_string(),
            2 => "info,curryforge=debug,xtask=debug".to_string(),
            _ => "debug,curryforge=trace,xtask=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate(args) => commands::generate(&args),
        Commands::Check(args) => commands::check(&args),
        Commands::List(args) => commands::list(&args),
    }
}
