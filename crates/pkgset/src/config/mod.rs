pub mod loader;
pub mod package;

pub use loader::{load_config, load_config_from_str, validate_config};
pub use package::PackageConfig;
