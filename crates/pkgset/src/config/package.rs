use serde::{Deserialize, Serialize};

/// How a local package directory is read and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfig {
    /// Glob patterns matched against file names; matching files are read.
    #[serde(default = "default_match_files")]
    pub match_files: Vec<String>,

    /// Read files inside hidden directories and hidden files.
    #[serde(default)]
    pub include_hidden: bool,

    /// Keep files that are missing from the pipeline output instead of
    /// deleting them.
    #[serde(default)]
    pub no_delete_files: bool,
}

fn default_match_files() -> Vec<String> {
    vec!["*.yaml".to_string(), "*.yml".to_string()]
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            match_files: default_match_files(),
            include_hidden: false,
            no_delete_files: false,
        }
    }
}

impl PackageConfig {
    /// Returns a copy that never deletes untouched files.
    pub fn preserving_files(mut self) -> Self {
        self.no_delete_files = true;
        self
    }
}
