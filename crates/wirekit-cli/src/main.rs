//! Wirekit CLI
//!
//! Generates, checks and inspects request wrappers for annotated handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Wirekit - request wrapper generator for Rust handlers
#[derive(Parser)]
#[command(name = "wirekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file or directory (defaults to the nearest wirekit.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate wrappers for source files and directories
    Generate {
        /// Files or directories to process
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Write artifacts into this directory instead of next to each source
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Regenerate even when artifacts are current
        #[arg(long, env = "WIREKIT_FORCE")]
        force: bool,

        /// Print artifacts instead of writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Fail when any artifact is missing or stale
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Directory artifacts were written to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print scanned handlers and warnings for one file as JSON
    Inspect {
        /// Source file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries artifacts and JSON
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Generate {
            paths,
            output,
            force,
            dry_run,
        } => {
            commands::generate::run(config, &paths, output, force, dry_run)?;
        }
        Commands::Check { paths, output } => {
            commands::check::run(config, &paths, output)?;
        }
        Commands::Inspect { file } => {
            commands::inspect::run(config, &file)?;
        }
    }

    Ok(())
}
