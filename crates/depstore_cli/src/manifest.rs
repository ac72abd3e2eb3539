//! Extension manifests consumed by `depstore record`.
//!
//! A manifest lists what a compilation pass produced, one table per
//! extension:
//!
//! ```toml
//! [[extension]]
//! name = "Blog"
//! loader = "DynamicExtensionLoader"
//! path = "~/Modules/Blog/Blog.csproj"
//! ```

use std::path::Path;

use depstore_cache::DependencyDescriptor;
use serde::Deserialize;

/// A parsed manifest.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExtensionManifest {
    /// Listed extensions, in file order.
    #[serde(default, rename = "extension")]
    pub extensions: Vec<ManifestEntry>,
}

/// One `[[extension]]` table.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Extension identifier.
    pub name: String,
    /// Loader that compiled or activated the extension.
    pub loader: String,
    /// Virtual path of the artifact the extension was built from.
    pub path: String,
}

impl ExtensionManifest {
    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read manifest {}: {e}", path.display()))?;
        Self::parse(&text).map_err(|e| format!("invalid manifest {}: {e}", path.display()).into())
    }

    /// Parses a manifest from TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Converts the entries into store descriptors.
    pub fn descriptors(&self) -> Vec<DependencyDescriptor> {
        self.extensions
            .iter()
            .map(|e| DependencyDescriptor::new(&e.name, &e.loader, &e.path))
            .collect()
    }
}
