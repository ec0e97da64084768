//! Listing the setters a package defines.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;

use super::reference::count_references;
use crate::error::{Result, SetterError};
use crate::package::{LocalPackage, Reader};
use crate::schema::{SchemaDocument, SetterDefinition};
use crate::sanitize;

/// A setter definition with the number of fields referencing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedSetter {
    pub definition: SetterDefinition,
    /// Referencing fields in the scanned resources; 0 when none were scanned.
    pub count: usize,
}

impl ListedSetter {
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

/// Lists every setter defined in the schema file, sorted by name.
///
/// When `resource_path` is given, each entry carries the number of fields in
/// that package referencing the setter.
pub fn list_setters(
    schema_path: impl AsRef<Path>,
    resource_path: Option<&Path>,
) -> Result<Vec<ListedSetter>> {
    let schema_path = schema_path.as_ref();
    let definitions = SchemaDocument::load(schema_path)
        .and_then(|document| document.setters())
        .map_err(SetterError::List)?;

    let counts = match resource_path {
        Some(path) => {
            let package = LocalPackage::new(path)?;
            count_references(&package.read()?)
        }
        None => BTreeMap::new(),
    };

    for (name, count) in &counts {
        if !definitions.iter().any(|d| &d.name == name) {
            warn!(
                "{} field(s) in '{}' reference undefined setter '{}'",
                count,
                sanitize::redact_path(resource_path.unwrap_or(schema_path)),
                name
            );
        }
    }

    Ok(definitions
        .into_iter()
        .map(|definition| {
            let count = counts.get(&definition.name).copied().unwrap_or(0);
            ListedSetter { definition, count }
        })
        .collect())
}
