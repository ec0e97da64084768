//! Package pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, transforming or writing a package.
#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Package directory not found: {0}")]
    PackageNotFound(PathBuf),

    #[error("Failed to read package directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete file '{path}': {source}")]
    DeleteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML document {index} in '{path}': {message}")]
    ParseYaml {
        path: PathBuf,
        index: usize,
        message: String,
    },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Filter failed on '{path}': {message}")]
    Filter { path: PathBuf, message: String },

    #[error("Filter failed: {0}")]
    Stage(String),
}

/// Result type for package operations.
pub type Result<T> = std::result::Result<T, PackageError>;
