//! Configuration parsing and validation
//!
//! This module handles loading the optional `wirekit.yaml` project file.
//!
//! ```yaml
//! output_suffix: _wirekit
//! runtime_crate: wirekit_runtime
//! multipart_max_memory: 33554432
//! codecs:
//!   - type: Uuid
//!     import: uuid::Uuid
//!     parse: "Uuid::parse_str({{ value }})"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name searched for by [`Config::load`] and [`Config::discover`]
pub const CONFIG_FILE: &str = "wirekit.yaml";

/// Project configuration from `wirekit.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Suffix appended to a source file stem to name its artifact
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Crate path generated code imports the runtime surface from
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,

    /// Memory bound passed to multipart form parsing, in bytes
    #[serde(default = "default_multipart_max_memory")]
    pub multipart_max_memory: u64,

    /// Additional type codecs
    #[serde(default)]
    pub codecs: Vec<CodecConfig>,

    /// Directory the configuration was loaded from
    #[serde(skip)]
    pub base_path: PathBuf,
}

fn default_output_suffix() -> String {
    "_wirekit".to_string()
}

fn default_runtime_crate() -> String {
    "wirekit_runtime".to_string()
}

fn default_multipart_max_memory() -> u64 {
    32 << 20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            runtime_crate: default_runtime_crate(),
            multipart_max_memory: default_multipart_max_memory(),
            codecs: Vec::new(),
            base_path: PathBuf::from("."),
        }
    }
}

/// A user-defined codec entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Type name the codec is keyed by
    #[serde(rename = "type")]
    pub type_name: String,

    /// `use` path required by the conversion expression
    #[serde(default)]
    pub import: Option<String>,

    /// Conversion expression template; `{{ value }}` is the `&str` source
    pub parse: String,

    /// The expression yields a `Result` rather than a value
    #[serde(default = "default_fallible")]
    pub fallible: bool,
}

fn default_fallible() -> bool {
    true
}

impl Config {
    /// Load configuration from a directory or a `wirekit.yaml` path
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./my-service")?;
    /// println!("runtime: {}", config.runtime_crate);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let (config_path, base_path) = if path.is_dir() {
            (path.join(CONFIG_FILE), path.to_path_buf())
        } else {
            (
                path.to_path_buf(),
                path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            )
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let mut config = Self::from_yaml(&contents)?;
        config.base_path = base_path;
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty file deserializes to unit, not a mapping.
        let config: Self = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Walk up from `start` to the nearest `wirekit.yaml`, or use defaults
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = std::path::absolute(start.as_ref())?;
        let found = start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file());

        match found {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Using configuration");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Check field values; `from_yaml` and `load` call this already
    pub fn validate(&self) -> Result<()> {
        if self.output_suffix.is_empty() {
            return Err(Error::ConfigInvalid {
                message: "output_suffix must not be empty".to_string(),
            });
        }

        let is_path = !self.runtime_crate.is_empty()
            && self.runtime_crate.split("::").all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if !is_path {
            return Err(Error::ConfigInvalid {
                message: format!(
                    "runtime_crate '{}' is not a valid Rust path",
                    self.runtime_crate
                ),
            });
        }

        if self.multipart_max_memory == 0 {
            return Err(Error::ConfigInvalid {
                message: "multipart_max_memory must be greater than zero".to_string(),
            });
        }

        for codec in &self.codecs {
            if codec.type_name.trim().is_empty() {
                return Err(Error::ConfigInvalid {
                    message: "codec entry is missing a type".to_string(),
                });
            }
            if !codec.parse.contains("value") {
                return Err(Error::ConfigInvalid {
                    message: format!(
                        "codec '{}' parse expression never references {{{{ value }}}}",
                        codec.type_name
                    ),
                });
            }
        }
        Ok(())
    }
}
