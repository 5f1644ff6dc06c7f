//! Error types for configuration loading and merging.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {file}: {hint}")]
    Parse { file: PathBuf, hint: String },

    #[error("{source_name} configuration must be a table of options, got {got}")]
    NotAnObject {
        source_name: &'static str,
        got: &'static str,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
