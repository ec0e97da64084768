//! Reading, updating and persisting schema documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::definition::{SetterDefinition, SetterValue, EXTENSION_KEY, SETTER_DEFINITION_PREFIX};
use super::error::{Result, SchemaError};
use crate::sanitize;

/// A schema document (e.g. a `Kptfile`) holding setter definitions under
/// `openAPI.definitions`.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    path: PathBuf,
    root: Value,
}

impl SchemaDocument {
    /// Loads a schema document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SchemaError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parses schema content. `path` is where the document will be saved.
    pub fn parse(content: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let root: Value = serde_yaml::from_str(content).map_err(|e| SchemaError::ParseYaml {
            path: path.clone(),
            message: e.to_string(),
        })?;

        // An empty file is a document without definitions
        let root = match root {
            Value::Null => Value::Mapping(Mapping::new()),
            Value::Mapping(_) => root,
            _ => {
                return Err(SchemaError::ParseYaml {
                    path,
                    message: "schema document must be a mapping".to_string(),
                })
            }
        };

        Ok(Self { path, root })
    }

    /// Returns the path this document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn definitions(&self) -> Option<&Mapping> {
        self.root
            .get("openAPI")
            .and_then(|o| o.get("definitions"))
            .and_then(Value::as_mapping)
    }

    fn definition_mut(&mut self, name: &str) -> Option<&mut Mapping> {
        self.root
            .get_mut("openAPI")
            .and_then(|o| o.get_mut("definitions"))
            .and_then(|d| d.get_mut(SetterDefinition::definition_key(name)))
            .and_then(Value::as_mapping_mut)
    }

    /// Returns every setter definition, sorted by name.
    pub fn setters(&self) -> Result<Vec<SetterDefinition>> {
        let Some(definitions) = self.definitions() else {
            return Ok(Vec::new());
        };

        let mut setters = Vec::new();
        for (key, node) in definitions {
            let Some(name) = key
                .as_str()
                .and_then(|k| k.strip_prefix(SETTER_DEFINITION_PREFIX))
            else {
                continue;
            };
            setters.push(SetterDefinition::from_definition(name, node)?);
        }

        setters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(setters)
    }

    /// Returns the definition of a single setter.
    pub fn setter(&self, name: &str) -> Result<SetterDefinition> {
        let key = SetterDefinition::definition_key(name);
        let node = self
            .definitions()
            .and_then(|d| d.get(key.as_str()))
            .ok_or_else(|| SchemaError::SetterNotFound {
                name: name.to_string(),
                path: self.path.clone(),
            })?;

        SetterDefinition::from_definition(name, node)
    }

    /// Applies an update to the named setter after validating the new value
    /// against the definition's declared type and enum.
    pub fn apply(&mut self, update: &SetterUpdate) -> Result<()> {
        let current = self.setter(&update.name)?;
        current.validate_value(&update.value)?;

        let invalid = || SchemaError::InvalidDefinition {
            name: update.name.clone(),
            message: format!("missing {}.setter", EXTENSION_KEY),
        };

        let definition = self.definition_mut(&update.name).ok_or_else(invalid)?;
        if !update.description.is_empty() {
            definition.insert(
                Value::from("description"),
                Value::from(update.description.as_str()),
            );
        }

        let setter = definition
            .get_mut(EXTENSION_KEY)
            .and_then(|ext| ext.get_mut("setter"))
            .and_then(Value::as_mapping_mut)
            .ok_or_else(invalid)?;

        match &update.value {
            SetterValue::Scalar(value) => {
                setter.insert(Value::from("value"), Value::from(value.as_str()));
                setter.remove("listValues");
            }
            SetterValue::List(values) => {
                let items = values.iter().map(|v| Value::from(v.as_str())).collect();
                setter.insert(Value::from("listValues"), Value::Sequence(items));
                setter.remove("value");
            }
        }

        if !update.set_by.is_empty() {
            setter.insert(Value::from("setBy"), Value::from(update.set_by.as_str()));
        }
        setter.insert(Value::from("isSet"), Value::Bool(true));

        Ok(())
    }

    /// Serializes the document.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(|e| SchemaError::SerializeYaml(e.to_string()))
    }

    /// Writes the document back to the path it was loaded from.
    pub fn save(&self) -> Result<()> {
        let content = self.to_yaml()?;
        fs::write(&self.path, content).map_err(|e| SchemaError::WriteFile {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// A request to change the value of one setter in a schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SetterUpdate {
    pub name: String,
    pub value: SetterValue,
    /// Replaces the stored description when non-empty.
    pub description: String,
    /// Replaces the stored attribution when non-empty.
    pub set_by: String,
}

impl SetterUpdate {
    pub fn new(name: impl Into<String>, value: SetterValue) -> Self {
        Self {
            name: name.into(),
            value,
            description: String::new(),
            set_by: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_set_by(mut self, set_by: impl Into<String>) -> Self {
        self.set_by = set_by.into();
        self
    }

    /// Loads the schema file, applies this update and writes it back.
    pub fn apply_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut document = SchemaDocument::load(path)?;
        document.apply(self)?;
        document.save()?;

        debug!(
            setter = %self.name,
            value = %self.value,
            schema = %sanitize::redact_path(path),
            "Updated setter definition"
        );
        Ok(())
    }
}
