use std::path::PathBuf;
use thiserror::Error;

use crate::package::PackageError;
use crate::schema::SchemaError;

#[derive(Error, Debug)]
pub enum SetterError {
    #[error("Schema update failed: {0}")]
    SchemaUpdate(#[source] SchemaError),

    #[error("Schema load failed: {0}")]
    SchemaLoad(#[source] SchemaError),

    #[error("Resource pipeline failed: {0}")]
    Pipeline(#[from] PackageError),

    #[error("Listing setters failed: {0}")]
    List(#[source] SchemaError),

    #[error("Setting '{setter}' in '{destination}' failed: {source}")]
    Propagation {
        setter: String,
        destination: PathBuf,
        #[source]
        source: Box<SetterError>,
    },
}

impl SetterError {
    /// Returns the error of the failing stage, looking through propagation context.
    pub fn stage(&self) -> &SetterError {
        match self {
            SetterError::Propagation { source, .. } => source.stage(),
            other => other,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SetterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_unwraps_propagation() {
        let inner = SetterError::SchemaLoad(SchemaError::SerializeYaml("boom".to_string()));
        let err = SetterError::Propagation {
            setter: "image-tag".to_string(),
            destination: PathBuf::from("dest"),
            source: Box::new(inner),
        };

        assert!(matches!(err.stage(), SetterError::SchemaLoad(_)));
        assert!(err.to_string().contains("image-tag"));
    }
}
