//! Setting setter values in schema files and the resources referencing them.

pub mod field;
pub mod list;
pub mod propagate;
pub mod reference;
pub mod substitute;

pub use field::{FieldSetter, FieldSetterStage, SchemaMode};
pub use list::{list_setters, ListedSetter};
pub use propagate::{propagate_all, propagate_all_with_config, PropagationEntry, PropagationReport};
pub use reference::{count_references, reference_comment, setter_reference};
pub use substitute::{substitute, SetterFilter, ShapeMismatch};
