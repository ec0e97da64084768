use std::path::Path;

use crate::config::package::PackageConfig;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PackageConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<PackageConfig, ConfigError> {
    // An empty file means all defaults
    if content.trim().is_empty() {
        return Ok(PackageConfig::default());
    }

    let config: PackageConfig = serde_yaml::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &PackageConfig) -> Result<(), ConfigError> {
    if config.match_files.is_empty() {
        return Err(ConfigError::Validation {
            message: "matchFiles must contain at least one pattern".to_string(),
        });
    }

    for pattern in &config.match_files {
        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_from_empty() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, PackageConfig::default());
        assert_eq!(config.match_files, vec!["*.yaml", "*.yml"]);
        assert!(!config.include_hidden);
        assert!(!config.no_delete_files);
    }

    #[test]
    fn test_load_partial_config() {
        let config = load_config_from_str("includeHidden: true\n").unwrap();
        assert!(config.include_hidden);
        assert_eq!(config.match_files.len(), 2);
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.yaml");
        std::fs::write(&path, "matchFiles: ['*.yaml', 'Kptfile']\nnoDeleteFiles: true\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.match_files, vec!["*.yaml", "Kptfile"]);
        assert!(config.no_delete_files);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/package.yaml");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_empty_patterns_rejected() {
        let result = load_config_from_str("matchFiles: []\n");
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = load_config_from_str("matchFiles: ['[unclosed']\n");
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_unparseable_config() {
        let result = load_config_from_str("matchFiles: {a: [\n");
        assert!(matches!(result, Err(ConfigError::ParseYaml(_))));
    }

    #[test]
    fn test_preserving_files() {
        let config = PackageConfig::default().preserving_files();
        assert!(config.no_delete_files);
    }
}
