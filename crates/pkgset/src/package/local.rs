//! Reading and writing a package directory on the local file system.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::document::{join_documents, split_documents, ResourceDocument};
use super::error::{PackageError, Result};
use super::pipeline::{Reader, Writer};
use crate::config::PackageConfig;
use crate::sanitize;

/// A directory of YAML resource files, usable as both pipeline input and output.
///
/// Writing only touches files whose content changed. Matched files that are
/// absent from the written documents are deleted unless
/// [`PackageConfig::no_delete_files`] is set.
#[derive(Debug, Clone)]
pub struct LocalPackage {
    root: PathBuf,
    config: PackageConfig,
    patterns: Vec<glob::Pattern>,
}

impl LocalPackage {
    /// Creates a package with the default configuration.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(root, PackageConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: PackageConfig) -> Result<Self> {
        let patterns = config
            .match_files
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| PackageError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.into(),
            config,
            patterns,
        })
    }

    /// Returns the package root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }

    /// Returns the matched files of the package, relative to the root and sorted.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(PackageError::PackageNotFound(self.root.clone()));
        }

        let include_hidden = self.config.include_hidden;
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // The root itself may live in a hidden directory
                e.depth() == 0 || include_hidden || !e.file_name().to_string_lossy().starts_with('.')
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| PackageError::ReadDirectory {
                path: self.root.clone(),
                source: e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !self.matches(&file_name) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(relative);
        }

        Ok(files)
    }
}

impl Reader for LocalPackage {
    fn read(&self) -> Result<Vec<ResourceDocument>> {
        let mut documents = Vec::new();

        for relative in self.files()? {
            let full_path = self.root.join(&relative);
            let content = fs::read_to_string(&full_path).map_err(|e| PackageError::ReadFile {
                path: full_path.clone(),
                source: e,
            })?;

            let file_documents = split_documents(&relative, &content);
            for document in &file_documents {
                document.parse()?;
            }
            documents.extend(file_documents);
        }

        debug!(
            package = %sanitize::redact_path(&self.root),
            documents = documents.len(),
            "Read package"
        );
        Ok(documents)
    }
}

impl Writer for LocalPackage {
    fn write(&self, documents: &[ResourceDocument]) -> Result<()> {
        let mut by_file: BTreeMap<&Path, Vec<&ResourceDocument>> = BTreeMap::new();
        for document in documents {
            by_file
                .entry(document.path.as_path())
                .or_default()
                .push(document);
        }

        let mut written = 0;
        for (relative, file_documents) in &by_file {
            let full_path = self.root.join(relative);
            let content = join_documents(file_documents.iter().copied());

            // Unchanged files keep their bytes and timestamps
            if fs::read_to_string(&full_path).ok().as_deref() == Some(content.as_str()) {
                continue;
            }

            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).map_err(|e| PackageError::WriteFile {
                    path: full_path.clone(),
                    source: e,
                })?;
            }
            fs::write(&full_path, content).map_err(|e| PackageError::WriteFile {
                path: full_path.clone(),
                source: e,
            })?;
            written += 1;
        }

        let mut deleted = 0;
        if !self.config.no_delete_files {
            let kept: BTreeSet<&Path> = by_file.keys().copied().collect();
            for relative in self.files()? {
                if kept.contains(relative.as_path()) {
                    continue;
                }
                let full_path = self.root.join(&relative);
                fs::remove_file(&full_path).map_err(|e| PackageError::DeleteFile {
                    path: full_path.clone(),
                    source: e,
                })?;
                deleted += 1;
            }
        }

        debug!(
            package = %sanitize::redact_path(&self.root),
            written,
            deleted,
            "Wrote package"
        );
        Ok(())
    }
}
