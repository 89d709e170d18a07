//! Error types for configuration handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration sources could not be read or merged.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration was read but holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be serialized for saving.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Filesystem error on a configuration file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, CoreError>;
