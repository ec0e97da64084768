//! Helpers for sanitizing paths before they enter log and span fields.
//!
//! Package paths can reveal user names and project layout, so events carry
//! only the last component.

use std::path::Path;

/// Returns only the last component of a path.
///
/// For a package directory this is the directory name, for a schema file the
/// file name.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Redacts a list of paths into a comma separated string of last components.
pub fn redact_paths<P: AsRef<Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|p| redact_path(p.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
