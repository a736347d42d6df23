//! CLI command implementations

pub mod check;
pub mod generate;
pub mod inspect;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use wirekit_core::Config;

/// Load `--config` when given, else discover from the first input path
pub fn load_config(config_path: Option<&str>, start: &Path) -> Result<Config> {
    match config_path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path);
            Config::load(path).context("Failed to load configuration")
        }
        None => {
            let dir = if start.is_file() {
                start
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."))
            } else {
                start
            };
            Config::discover(dir).context("Failed to discover configuration")
        }
    }
}

/// First input path, used as the discovery start
pub fn discovery_start(paths: &[PathBuf]) -> &Path {
    paths.first().map(PathBuf::as_path).unwrap_or(Path::new("."))
}
