pub mod config;
pub mod error;
pub mod package;
pub mod sanitize;
pub mod schema;
pub mod setter;
pub mod telemetry;

pub use config::{load_config, PackageConfig};
pub use error::{ConfigError, Result, SetterError};
pub use package::{LocalPackage, PackageError, Pipeline, ResourceDocument};
pub use schema::{SchemaDocument, SchemaError, SchemaRegistry, SetterDefinition, SetterValue};
pub use setter::{
    list_setters, propagate_all, FieldSetter, FieldSetterStage, ListedSetter, PropagationReport,
    SchemaMode,
};
