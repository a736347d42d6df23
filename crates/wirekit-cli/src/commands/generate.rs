//! Generate request wrappers

use anyhow::{Context, Result};
use std::path::PathBuf;
use wirekit_codegen::{FileStatus, GenerateOptions, Pipeline, collect_sources};

use super::{discovery_start, load_config};

/// Run the generate command
pub fn run(
    config_path: Option<&str>,
    paths: &[PathBuf],
    output: Option<PathBuf>,
    force: bool,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(config_path, discovery_start(paths))?;
    let sources =
        collect_sources(paths, &config.output_suffix).context("Failed to collect sources")?;
    tracing::info!("Processing {} source files", sources.len());

    let options = GenerateOptions {
        output_dir: output,
        force,
        dry_run,
    };
    let pipeline = Pipeline::new(config, options).context("Invalid configuration")?;
    let report = pipeline.process_all(&sources);

    for outcome in &report.outcomes {
        match outcome.status {
            FileStatus::Generated => tracing::info!(
                "✓ {} -> {} ({} handlers)",
                outcome.source.display(),
                outcome.artifact.display(),
                outcome.handlers
            ),
            FileStatus::DryRun => {
                if let Some(content) = &outcome.content {
                    println!("// ==> {}", outcome.artifact.display());
                    print!("{}", content);
                }
            }
            FileStatus::Skipped | FileStatus::NoHandlers => {}
        }
    }
    for failure in &report.failures {
        tracing::error!("✗ {}: {}", failure.source.display(), failure.error);
    }

    tracing::info!(
        "Generated {}, up to date {}, dry run {}, failed {}",
        report.count(FileStatus::Generated),
        report.count(FileStatus::Skipped),
        report.count(FileStatus::DryRun),
        report.failures.len()
    );

    if !report.is_success() {
        anyhow::bail!("{} files failed to generate", report.failures.len());
    }
    Ok(())
}
