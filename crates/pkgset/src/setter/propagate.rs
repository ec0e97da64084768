//! Propagating every setter of a source package into destination packages.

use std::path::{Path, PathBuf};

use tracing::{info, info_span};

use super::field::{FieldSetter, SchemaMode};
use super::list::list_setters;
use crate::config::PackageConfig;
use crate::error::{Result, SetterError};
use crate::sanitize;
use crate::schema::SchemaRegistry;

/// One substitution pass of a propagation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationEntry {
    pub setter: String,
    pub destination: PathBuf,
    /// Fields set in the destination.
    pub count: usize,
}

/// The passes performed by [`propagate_all`], in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub entries: Vec<PropagationEntry>,
}

impl PropagationReport {
    /// Total number of fields set across all passes.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn count_for(&self, setter: &str, destination: &Path) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.setter == setter && e.destination == destination)
            .map(|e| e.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Applies every setter defined in `source_schema` to the resources of each
/// destination directory.
///
/// Setters are visited in name order and, for each setter, destinations in the
/// given order. The source schema is registered but never rewritten and
/// destination schema files are not touched. The first failure stops the run;
/// passes already completed stay applied.
pub fn propagate_all<P: AsRef<Path>>(
    registry: &mut SchemaRegistry,
    source_schema: impl AsRef<Path>,
    source_resources: impl AsRef<Path>,
    destinations: &[P],
) -> Result<PropagationReport> {
    propagate_all_with_config(
        registry,
        source_schema,
        source_resources,
        destinations,
        &PackageConfig::default(),
    )
}

/// Like [`propagate_all`], reading destinations with the given package config.
pub fn propagate_all_with_config<P: AsRef<Path>>(
    registry: &mut SchemaRegistry,
    source_schema: impl AsRef<Path>,
    source_resources: impl AsRef<Path>,
    destinations: &[P],
    config: &PackageConfig,
) -> Result<PropagationReport> {
    let source_schema = source_schema.as_ref();
    let source_resources = source_resources.as_ref();

    let _span = info_span!("propagate",
        schema = %sanitize::redact_path(source_schema),
        destinations = %sanitize::redact_paths(destinations),
    )
    .entered();

    let listed = list_setters(source_schema, Some(source_resources))?;
    let mut report = PropagationReport::default();

    for entry in &listed {
        let setter = FieldSetter::from_definition(&entry.definition)
            .with_schema_mode(SchemaMode::ReloadOnly)
            .with_package_config(config.clone());

        for destination in destinations {
            let destination = destination.as_ref();
            let count = setter
                .set(registry, source_schema, destination)
                .map_err(|e| SetterError::Propagation {
                    setter: setter.name.clone(),
                    destination: destination.to_path_buf(),
                    source: Box::new(e),
                })?;

            report.entries.push(PropagationEntry {
                setter: setter.name.clone(),
                destination: destination.to_path_buf(),
                count,
            });
        }
    }

    info!(
        setters = listed.len(),
        passes = report.len(),
        fields = report.total(),
        "Propagated setters"
    );
    Ok(report)
}
