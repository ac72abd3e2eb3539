//! Configuration types deserialized from `depstore.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// Loader that compiles an extension from its sources at runtime.
pub const DYNAMIC_EXTENSION_LOADER: &str = "DynamicExtensionLoader";

/// Loader that activates an extension from a precompiled binary.
pub const PRECOMPILED_EXTENSION_LOADER: &str = "PrecompiledExtensionLoader";

/// Default location of the dependency record, relative to the store root.
pub const DEFAULT_RECORD_PATH: &str = "Dependencies/dependencies.compiled.xml";

/// The top-level configuration parsed from `depstore.toml`.
///
/// Every section is optional; a missing file or an empty one yields the
/// defaults of each section.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DepstoreConfig {
    /// Where the content store lives and where the record is kept.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Which loaders the dependency record tracks.
    #[serde(default)]
    pub loaders: LoaderConfig,
    /// Log verbosity.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage location settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Physical root directory of the content store. Relative paths are
    /// resolved against the directory holding `depstore.toml`.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Virtual path of the dependency record inside the store.
    #[serde(default = "default_record_path")]
    pub record_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            record_path: default_record_path(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_record_path() -> String {
    DEFAULT_RECORD_PATH.to_string()
}

/// The set of loader names whose extensions are recorded.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Exactly two distinct loader names.
    #[serde(default = "default_supported_loaders")]
    pub supported: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            supported: default_supported_loaders(),
        }
    }
}

fn default_supported_loaders() -> Vec<String> {
    vec![
        DYNAMIC_EXTENSION_LOADER.to_string(),
        PRECOMPILED_EXTENSION_LOADER.to_string(),
    ]
}

/// Logging settings.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level written to stderr.
    #[serde(default)]
    pub level: LogLevel,
}

/// Log verbosity level.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-read cache hits.
    Trace,
    /// Cache population and skipped writes.
    Debug,
    /// Record writes and corrupt-record fallbacks (default).
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the lowercase name, as accepted by `tracing` filters.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = DepstoreConfig::default();
        assert_eq!(config.storage.root, PathBuf::from("."));
        assert_eq!(config.storage.record_path, DEFAULT_RECORD_PATH);
        assert_eq!(
            config.loaders.supported,
            vec![DYNAMIC_EXTENSION_LOADER, PRECOMPILED_EXTENSION_LOADER]
        );
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn log_level_names() {
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::default().as_str(), "info");
    }
}
