//! In-memory YAML documents paired with the file they came from.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::error::{PackageError, Result};

/// One YAML document of a package file.
///
/// Joining the documents of a file with [`join_documents`] reproduces the
/// file's original bytes exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDocument {
    /// Path relative to the package root.
    pub path: PathBuf,
    /// Position of the document within its file.
    pub index: usize,
    /// The `---` line preceding the document, including its line break.
    /// Empty for a leading document without a marker.
    pub separator: String,
    /// The document text.
    pub content: String,
}

impl ResourceDocument {
    /// Creates a single-document file entry.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            index: 0,
            separator: String::new(),
            content: content.into(),
        }
    }

    /// Whether the document holds nothing but whitespace and comments.
    pub fn is_blank(&self) -> bool {
        self.content.lines().all(|line| {
            let trimmed = line.trim();
            trimmed.is_empty() || trimmed.starts_with('#')
        })
    }

    /// Parses the document, mapping failures to [`PackageError::ParseYaml`].
    pub fn parse(&self) -> Result<Value> {
        if self.is_blank() {
            return Ok(Value::Null);
        }
        serde_yaml::from_str(&self.content).map_err(|e| PackageError::ParseYaml {
            path: self.path.clone(),
            index: self.index,
            message: e.to_string(),
        })
    }
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed == "---" || trimmed.starts_with("--- #")
}

/// Splits file content into documents on `---` marker lines.
///
/// Always yields at least one document so that empty files survive a
/// read/write cycle.
pub fn split_documents(path: &Path, text: &str) -> Vec<ResourceDocument> {
    let mut documents = Vec::new();
    let mut separator = String::new();
    let mut content = String::new();

    for line in text.split_inclusive('\n') {
        if is_separator(line) {
            if !(separator.is_empty() && content.is_empty()) {
                documents.push(ResourceDocument {
                    path: path.to_path_buf(),
                    index: documents.len(),
                    separator: std::mem::take(&mut separator),
                    content: std::mem::take(&mut content),
                });
            }
            separator = line.to_string();
        } else {
            content.push_str(line);
        }
    }

    documents.push(ResourceDocument {
        path: path.to_path_buf(),
        index: documents.len(),
        separator,
        content,
    });
    documents
}

/// Joins the documents of one file back into its content, in index order.
pub fn join_documents<'a, I>(documents: I) -> String
where
    I: IntoIterator<Item = &'a ResourceDocument>,
{
    let mut ordered: Vec<&ResourceDocument> = documents.into_iter().collect();
    ordered.sort_by_key(|d| d.index);

    ordered.iter().fold(String::new(), |mut out, doc| {
        out.push_str(&doc.separator);
        out.push_str(&doc.content);
        out
    })
}
