//! Schema store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, updating or registering setter schemas.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write schema file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in '{path}': {message}")]
    ParseYaml { path: PathBuf, message: String },

    #[error("Failed to serialize schema: {0}")]
    SerializeYaml(String),

    #[error("Invalid setter definition '{name}': {message}")]
    InvalidDefinition { name: String, message: String },

    #[error("No setter '{name}' found in '{path}'")]
    SetterNotFound { name: String, path: PathBuf },

    #[error("Setter '{name}' expects a {expected} value, got a {actual} value")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid value '{value}' for setter '{name}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        SchemaError::ParseYaml {
            path: PathBuf::new(),
            message: err.to_string(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
