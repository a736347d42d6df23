//! Check that artifacts are current

use anyhow::{Context, Result};
use std::path::PathBuf;
use wirekit_codegen::{GenerateOptions, Pipeline, collect_sources};

use super::{discovery_start, load_config};

/// Run the check command
pub fn run(config_path: Option<&str>, paths: &[PathBuf], output: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path, discovery_start(paths))?;
    let sources =
        collect_sources(paths, &config.output_suffix).context("Failed to collect sources")?;

    let options = GenerateOptions {
        output_dir: output,
        ..Default::default()
    };
    let pipeline = Pipeline::new(config, options).context("Invalid configuration")?;

    let mut stale = 0;
    for source in &sources {
        let reason = pipeline
            .check_file(source)
            .with_context(|| format!("Failed to check {}", source.display()))?;
        if let Some(reason) = reason {
            println!("{}: {}", source.display(), reason);
            stale += 1;
        }
    }

    if stale > 0 {
        anyhow::bail!("{} of {} files need regeneration", stale, sources.len());
    }
    tracing::info!("✓ {} files up to date", sources.len());
    Ok(())
}
