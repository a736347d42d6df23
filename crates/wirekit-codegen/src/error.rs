//! Error types for code generation

use thiserror::Error;

/// Result type for codegen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum Error {
    /// Source model error, including unparsable source
    #[error(transparent)]
    Core(#[from] wirekit_core::Error),

    /// A configured codec could not be registered
    #[error("invalid codec for '{type_name}': {message}")]
    InvalidCodec {
        /// Type the codec was declared for
        type_name: String,
        /// Error description
        message: String,
    },

    /// Invalid or failing template
    #[error("invalid template: {0}")]
    InvalidTemplate(#[from] minijinja::Error),

    /// A path given for generation does not exist
    #[error("source path not found: {path}")]
    SourceNotFound {
        /// Path as given
        path: String,
    },

    /// Artifact could not be written
    #[error("failed to write artifact {path}: {source}")]
    WriteArtifact {
        /// Artifact path
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}
