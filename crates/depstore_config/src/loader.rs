//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::DepstoreConfig;
use std::collections::BTreeSet;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "depstore.toml";

/// Loads `<dir>/depstore.toml`, falling back to defaults if the file does
/// not exist.
///
/// A relative `storage.root` is resolved against `dir`.
pub fn load_config(dir: &Path) -> Result<DepstoreConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        let mut config = DepstoreConfig::default();
        config.storage.root = dir.join(&config.storage.root);
        return Ok(config);
    }
    load_config_file(&path)
}

/// Loads and validates a configuration file at an explicit path.
///
/// Unlike [`load_config`], a missing file is an error. A relative
/// `storage.root` is resolved against the file's directory.
pub fn load_config_file(path: &Path) -> Result<DepstoreConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = load_config_from_str(&content)?;
    if config.storage.root.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.storage.root = base.join(&config.storage.root);
    }
    Ok(config)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies. Paths are left as
/// written.
pub fn load_config_from_str(content: &str) -> Result<DepstoreConfig, ConfigError> {
    let config: DepstoreConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates loader names and the record path.
fn validate_config(config: &DepstoreConfig) -> Result<(), ConfigError> {
    let loaders = &config.loaders.supported;
    if loaders.len() != 2 {
        return Err(ConfigError::ValidationError(format!(
            "loaders.supported must name exactly two loaders, found {}",
            loaders.len()
        )));
    }
    if loaders.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "loaders.supported contains an empty name".to_string(),
        ));
    }
    let distinct: BTreeSet<&str> = loaders.iter().map(String::as_str).collect();
    if distinct.len() != loaders.len() {
        return Err(ConfigError::ValidationError(
            "loaders.supported contains duplicates".to_string(),
        ));
    }

    let record = config.storage.record_path.trim();
    let without_tilde = record.strip_prefix("~/").unwrap_or(record);
    if without_tilde.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.record_path is empty".to_string(),
        ));
    }
    if without_tilde.starts_with(['/', '\\']) || Path::new(without_tilde).is_absolute() {
        return Err(ConfigError::ValidationError(format!(
            "storage.record_path must be relative to the store root: {record}"
        )));
    }
    if without_tilde.split(['/', '\\']).any(|s| s == "..") {
        return Err(ConfigError::ValidationError(format!(
            "storage.record_path must not contain '..': {record}"
        )));
    }
    Ok(())
}
