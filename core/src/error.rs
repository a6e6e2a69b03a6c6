//! Error types for configuration and schema loading.

use thiserror::Error;

/// Errors produced while loading configuration, schema models or filters.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization or deserialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization or deserialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A filter string could not be parsed.
    #[error("Invalid finding filter '{0}'")]
    InvalidFilter(String),

    /// A severity name is not one of error, warning, info or suppress.
    #[error("Invalid finding severity '{0}'")]
    InvalidSeverity(String),

    /// A schema node names a module the model does not contain.
    #[error("Unknown module '{0}' in schema model")]
    UnknownModule(String),

    /// A finding type code is empty or malformed.
    #[error("Invalid finding type '{0}'")]
    InvalidFindingType(String),
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, CoreError>;
