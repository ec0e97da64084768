#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use walkdir::WalkDir;

pub fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// A package directory living in its own temporary directory.
pub struct TestPackage {
    temp_dir: TempDir,
}

impl TestPackage {
    /// Creates a package holding a copy of `tests/fixtures/<name>`.
    pub fn from_fixture(name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .copy_from(fixtures_path().join(name), &["**/*"])
            .expect("Failed to copy fixture");
        Self { temp_dir }
    }

    /// Creates an empty package directory.
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the package's schema file.
    pub fn schema_path(&self) -> PathBuf {
        self.path().join("Kptfile")
    }

    pub fn child(&self, relative: &str) -> ChildPath {
        self.temp_dir.child(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    pub fn write(&self, relative: &str, content: &str) {
        self.child(relative)
            .write_str(content)
            .expect("Failed to write package file");
    }

    /// Bytes of every file in the package, keyed by relative path.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(self.path())
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let relative = e.path().strip_prefix(self.path()).unwrap().to_path_buf();
                let bytes = std::fs::read(e.path()).expect("Failed to read package file");
                (relative, bytes)
            })
            .collect()
    }

    /// Relative paths whose bytes differ from an earlier snapshot.
    pub fn changed_since(&self, before: &BTreeMap<PathBuf, Vec<u8>>) -> Vec<PathBuf> {
        let after = self.snapshot();
        let mut changed: Vec<PathBuf> = after
            .iter()
            .filter(|(path, bytes)| before.get(*path) != Some(*bytes))
            .map(|(path, _)| path.clone())
            .collect();
        changed.extend(before.keys().filter(|p| !after.contains_key(*p)).cloned());
        changed.sort();
        changed
    }
}
