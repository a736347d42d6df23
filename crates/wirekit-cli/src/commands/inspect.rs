//! Dump scanned handlers as JSON

use anyhow::{Context, Result};
use std::path::Path;
use wirekit_codegen::{GenerateOptions, Pipeline};

use super::load_config;

/// Run the inspect command
pub fn run(config_path: Option<&str>, file: &Path) -> Result<()> {
    let config = load_config(config_path, file)?;
    let pipeline =
        Pipeline::new(config, GenerateOptions::default()).context("Invalid configuration")?;

    let scanned = pipeline
        .scan_file(file)
        .with_context(|| format!("Failed to scan {}", file.display()))?;
    let json = serde_json::to_string_pretty(&scanned)?;
    println!("{}", json);
    Ok(())
}
