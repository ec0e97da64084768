//! Packages of YAML resource files and the pipeline transforming them.

pub mod document;
pub mod error;
pub mod local;
pub mod pipeline;

pub use document::{join_documents, split_documents, ResourceDocument};
pub use error::{PackageError, Result};
pub use local::LocalPackage;
pub use pipeline::{Filter, Pipeline, Reader, Writer};
