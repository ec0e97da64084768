//! Setting one setter in a schema file and in the resources referencing it.

use std::path::{Path, PathBuf};

use tracing::{info, info_span};

use super::substitute::SetterFilter;
use crate::config::PackageConfig;
use crate::error::{Result, SetterError};
use crate::package::{
    Filter, LocalPackage, PackageError, Pipeline, ResourceDocument, Result as PackageResult,
};
use crate::sanitize;
use crate::schema::{SchemaRegistry, SetterDefinition, SetterUpdate, SetterValue};

/// What a [`FieldSetter`] does with the schema file before touching resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    /// Write the new value into the schema file, then register it.
    #[default]
    Update,
    /// Leave the schema file alone and only register its current definitions.
    ReloadOnly,
}

/// Sets a setter's value in a schema file and in every resource field
/// referencing it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSetter {
    pub name: String,
    pub value: SetterValue,
    /// Stored as the setter description when non-empty.
    pub description: String,
    /// Stored as the setter attribution when non-empty.
    pub set_by: String,
    pub schema_mode: SchemaMode,
    /// How the resource directory is read. Files are never deleted.
    pub package: PackageConfig,
}

impl FieldSetter {
    pub fn new(name: impl Into<String>, value: SetterValue) -> Self {
        Self {
            name: name.into(),
            value,
            description: String::new(),
            set_by: String::new(),
            schema_mode: SchemaMode::Update,
            package: PackageConfig::default(),
        }
    }

    /// Creates a setter carrying the value and metadata of a definition.
    pub fn from_definition(definition: &SetterDefinition) -> Self {
        Self::new(definition.name.clone(), definition.value.clone())
            .with_description(definition.description.clone())
            .with_set_by(definition.set_by.clone())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_set_by(mut self, set_by: impl Into<String>) -> Self {
        self.set_by = set_by.into();
        self
    }

    pub fn with_schema_mode(mut self, mode: SchemaMode) -> Self {
        self.schema_mode = mode;
        self
    }

    pub fn with_package_config(mut self, config: PackageConfig) -> Self {
        self.package = config;
        self
    }

    /// Updates the schema file (unless reload-only), registers it, then
    /// rewrites every field under `resource_path` referencing the setter.
    ///
    /// Returns the number of referencing fields. A schema failure aborts
    /// before any resource is read; resource files already written by a
    /// failing pass are not restored.
    pub fn set(
        &self,
        registry: &mut SchemaRegistry,
        schema_path: impl AsRef<Path>,
        resource_path: impl AsRef<Path>,
    ) -> Result<usize> {
        let schema_path = schema_path.as_ref();
        let resource_path = resource_path.as_ref();

        let _span = info_span!("set_field",
            setter = %self.name,
            schema = %sanitize::redact_path(schema_path),
            package = %sanitize::redact_path(resource_path),
        )
        .entered();

        if self.schema_mode == SchemaMode::Update {
            SetterUpdate::new(self.name.clone(), self.value.clone())
                .with_description(self.description.clone())
                .with_set_by(self.set_by.clone())
                .apply_to_file(schema_path)
                .map_err(SetterError::SchemaUpdate)?;
        }

        registry
            .add_schema_from_file(schema_path)
            .map_err(SetterError::SchemaLoad)?;

        let package =
            LocalPackage::with_config(resource_path, self.package.clone().preserving_files())?;
        let mut filter = SetterFilter::new(self.name.as_str(), registry);

        Pipeline::new()
            .input(&package)
            .filter(&mut filter)
            .output(&package)
            .execute()?;

        let count = filter.count();
        info!(count, "Set setter fields");
        Ok(count)
    }
}

/// Runs a [`FieldSetter`] as a pipeline stage.
///
/// The stage ignores the documents flowing through it and passes them on
/// unchanged; the setter works on its own schema and resource paths.
pub struct FieldSetterStage<'r> {
    setter: FieldSetter,
    registry: &'r mut SchemaRegistry,
    schema_path: PathBuf,
    resource_path: PathBuf,
    count: usize,
}

impl<'r> FieldSetterStage<'r> {
    pub fn new(
        setter: FieldSetter,
        registry: &'r mut SchemaRegistry,
        schema_path: impl Into<PathBuf>,
        resource_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            setter,
            registry,
            schema_path: schema_path.into(),
            resource_path: resource_path.into(),
            count: 0,
        }
    }

    /// Fields set by the last run.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Filter for FieldSetterStage<'_> {
    fn filter(&mut self, documents: Vec<ResourceDocument>) -> PackageResult<Vec<ResourceDocument>> {
        self.count = self
            .setter
            .set(self.registry, &self.schema_path, &self.resource_path)
            .map_err(|e| PackageError::Stage(e.to_string()))?;
        Ok(documents)
    }
}
