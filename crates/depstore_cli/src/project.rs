//! Shared command setup: configuration lookup and store construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use depstore_cache::DependencyStore;
use depstore_config::DepstoreConfig;
use depstore_vfs::{ContentStore, DiskStore};

use crate::GlobalArgs;

/// Everything a command needs: the loaded configuration, the content store
/// rooted where it says, and the dependency store on top of it.
pub struct Project {
    /// The effective configuration, after `--root` is applied.
    pub config: DepstoreConfig,
    /// Content store the record and extension sources are read through.
    pub content: Arc<dyn ContentStore>,
    /// The dependency store.
    pub store: DependencyStore,
}

impl Project {
    /// Loads configuration per the global flags and opens the store.
    pub fn open(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = load_project_config(global)?;
        if let Some(ref root) = global.root {
            config.storage.root = PathBuf::from(root);
        }

        let content: Arc<dyn ContentStore> = Arc::new(DiskStore::new(config.storage.root.clone()));
        let store = DependencyStore::from_config(Arc::clone(&content), &config)?;
        Ok(Self {
            config,
            content,
            store,
        })
    }
}

/// Resolves the configuration from global CLI args.
///
/// If `--config` is specified, uses that path (file → load it, directory →
/// look for `depstore.toml` inside). Otherwise looks in the current
/// directory. A directory without a config file yields the defaults.
pub fn load_project_config(
    global: &GlobalArgs,
) -> Result<DepstoreConfig, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => {
            let p = Path::new(config_path);
            if p.is_file() {
                Ok(depstore_config::load_config_file(p)?)
            } else if p.is_dir() {
                Ok(depstore_config::load_config(p)?)
            } else {
                Err(format!("config path '{config_path}' does not exist").into())
            }
        }
        None => Ok(depstore_config::load_config(&std::env::current_dir()?)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depstore_config::CONFIG_FILE;
    use std::fs;

    fn global_with(config: Option<&Path>, root: Option<&Path>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: config.map(|p| p.display().to_string()),
            root: root.map(|p| p.display().to_string()),
        }
    }

    #[test]
    fn config_file_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE);
        fs::write(&file, "[storage]\nroot = \"App_Data\"\n").unwrap();

        let config = load_project_config(&global_with(Some(&file), None)).unwrap();
        assert_eq!(config.storage.root, dir.path().join("App_Data"));
    }

    #[test]
    fn config_directory_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_project_config(&global_with(Some(dir.path()), None)).unwrap();
        assert_eq!(config.loaders, depstore_config::LoaderConfig::default());
        assert!(config.storage.root.starts_with(dir.path()));
    }

    #[test]
    fn missing_config_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join(CONFIG_FILE);
        let err = load_project_config(&global_with(Some(&missing), None)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE);
        fs::write(&file, "[loaders]\nsupported = [\"Only\"]\n").unwrap();
        assert!(load_project_config(&global_with(Some(&file), None)).is_err());
    }

    #[test]
    fn root_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let project = Project::open(&global_with(Some(dir.path()), Some(&data))).unwrap();
        assert_eq!(project.config.storage.root, data);
        assert_eq!(
            project.content.map_to_physical_path(project.store.record_path()),
            data.join("Dependencies").join("dependencies.compiled.xml")
        );
    }
}
