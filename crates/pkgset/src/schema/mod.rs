//! OpenAPI schema documents holding setter definitions.
//!
//! Setters are declared in a package manifest (typically a `Kptfile`):
//!
//! ```yaml
//! openAPI:
//!   definitions:
//!     io.k8s.cli.setters.image-tag:
//!       description: image tag
//!       x-k8s-cli:
//!         setter:
//!           name: image-tag
//!           value: v1
//!           setBy: alice
//! ```

pub mod definition;
pub mod error;
pub mod registry;
pub mod store;

pub use definition::{
    SchemaType, SetterDefinition, SetterValue, EXTENSION_KEY, SETTER_DEFINITION_PREFIX,
};
pub use error::{Result, SchemaError};
pub use registry::SchemaRegistry;
pub use store::{SchemaDocument, SetterUpdate};
