//! Binary entry point for motifscope.
//!
//! This binary provides the CLI over the motif retrieval and validation
//! services.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{AbTestArgs, HitsArgs, PruneArgs, ValidateArgs};
use motifscope::config::MotifscopeConfig;
use motifscope::observability::{self, LoggingConfig, MetricsHandle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Motifscope - structural motif retrieval and validation.
#[derive(Parser)]
#[command(name = "motifscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write a Prometheus metrics snapshot to this file at exit.
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Filter a motif document down to motifs worth evaluating.
    Prune(PruneArgs),

    /// Measure how well each motif's query recovers its other instances.
    Hits(HitsArgs),

    /// Compare real queries against random decoy queries.
    AbTest(AbTestArgs),

    /// Validate sampled hits with a bounded graph edit distance.
    Validate(ValidateArgs),
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let logging = LoggingConfig::from_settings(&config.logging, cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    let metrics = match cli.metrics_out.as_ref().map(|_| observability::install_recorder()) {
        Some(Ok(handle)) => Some(handle),
        Some(Err(e)) => {
            eprintln!("Failed to install metrics recorder: {e}");
            return ExitCode::FAILURE;
        }
        None => None,
    };

    let result = run_command(cli.command, &config);
    flush_metrics(metrics.as_ref(), cli.metrics_out.as_deref());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the configuration file, if any, then environment overrides.
fn load_config(path: Option<&Path>) -> motifscope::Result<MotifscopeConfig> {
    let config = match path {
        Some(path) => MotifscopeConfig::load_from_file(path)?,
        None => MotifscopeConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}

/// Runs the selected command.
fn run_command(command: Commands, config: &MotifscopeConfig) -> commands::CommandResult {
    match command {
        Commands::Prune(args) => commands::cmd_prune(config, args),
        Commands::Hits(args) => commands::cmd_hits(config, args),
        Commands::AbTest(args) => commands::cmd_ab_test(config, args),
        Commands::Validate(args) => commands::cmd_validate(config, args),
    }
}

fn flush_metrics(handle: Option<&MetricsHandle>, path: Option<&Path>) {
    if let (Some(handle), Some(path)) = (handle, path)
        && let Err(e) = handle.write_snapshot(path)
    {
        eprintln!("Failed to write metrics snapshot: {e}");
    }
}
