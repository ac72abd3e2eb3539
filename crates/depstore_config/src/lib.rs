//! Parsing and validation of `depstore.toml` configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`DepstoreConfig`]: where the content store lives, where the dependency
//! record is kept, which two loaders are tracked, and how verbose logging is.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
