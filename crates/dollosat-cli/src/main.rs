//! dollosat CLI - clustered 1-Dollo matrix reconstruction through SAT sampling.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "dollosat")]
#[command(author, version, about = "Clustered 1-Dollo matrix reconstruction via SAT sampling", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with sampler paths and defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a matrix into a CNF formula and its variable map
    Encode(commands::encode::EncodeArgs),
    /// Decode sampler output into clustered matrices
    Decode(commands::decode::DecodeArgs),
    /// Look for one reconstruction with the built-in bounded search
    Check(commands::check::CheckArgs),
    /// Encode, run an external sampler and decode every sample
    Sample(commands::sample::SampleArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Encode(args) => commands::encode::run(args, &config),
        Commands::Decode(args) => commands::decode::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Sample(args) => commands::sample::run(args, &config),
    }
}
