//! Lookup of registered setter definitions.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::definition::SetterDefinition;
use super::error::Result;
use super::store::SchemaDocument;
use crate::sanitize;

/// Setter definitions registered from schema documents, keyed by setter name.
///
/// Passed explicitly to every operation that registers or looks up setters.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    definitions: HashMap<String, SetterDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every setter defined in the schema file, replacing existing
    /// definitions with the same name. Returns the number of setters registered.
    pub fn add_schema_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let document = SchemaDocument::load(path)?;
        let count = self.add_schema(&document)?;

        debug!(
            schema = %sanitize::redact_path(path),
            setters = count,
            "Registered schema definitions"
        );
        Ok(count)
    }

    /// Registers every setter defined in an already loaded document.
    pub fn add_schema(&mut self, document: &SchemaDocument) -> Result<usize> {
        let setters = document.setters()?;
        let count = setters.len();
        for definition in setters {
            self.add_definition(definition);
        }
        Ok(count)
    }

    /// Registers a single definition, returning the one it replaced.
    pub fn add_definition(&mut self, definition: SetterDefinition) -> Option<SetterDefinition> {
        self.definitions.insert(definition.name.clone(), definition)
    }

    pub fn get(&self, name: &str) -> Option<&SetterDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Returns the registered setter names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
