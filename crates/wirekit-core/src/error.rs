//! Error types for wirekit-core

use thiserror::Error;

/// Result type alias for wirekit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in wirekit-core
#[derive(Error, Debug)]
pub enum Error {
    /// Source text could not be parsed as Rust
    #[error("{path}:{line}:{column}: {message}")]
    Parse {
        /// File the source came from
        path: String,
        /// 1-based line of the first syntax error
        line: usize,
        /// 1-based column of the first syntax error
        column: usize,
        /// Parser diagnostic
        message: String,
    },

    /// Source file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
