//! Descriptor types flowing into and out of the dependency record.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One extension's dependency as reported by a loader after a compilation
/// pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDescriptor {
    /// Extension identifier.
    pub name: String,
    /// Name of the loader that compiled or activated the extension.
    pub loader_name: String,
    /// Virtual path of the artifact the extension was built from.
    pub virtual_path: String,
}

impl DependencyDescriptor {
    /// Creates a descriptor.
    pub fn new(
        name: impl Into<String>,
        loader_name: impl Into<String>,
        virtual_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            loader_name: loader_name.into(),
            virtual_path: virtual_path.into(),
        }
    }
}

/// A recorded dependency together with the content hash it had when the
/// record was written.
///
/// This is the persisted shape: field order here is the element order in
/// the record, and the serde names are the element names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedExtensionDescriptor {
    /// Extension identifier. Lookups compare it case-insensitively.
    #[serde(rename = "ExtensionId")]
    pub extension_id: String,
    /// Loader name, one of the supported loaders.
    #[serde(rename = "LoaderName")]
    pub loader_name: String,
    /// Virtual path of the artifact the hash was taken of.
    #[serde(rename = "VirtualPath")]
    pub virtual_path: String,
    /// Opaque content hash of the artifact.
    #[serde(rename = "Hash")]
    pub hash: String,
}

impl ActivatedExtensionDescriptor {
    /// Builds the record entry for `descriptor` with its content `hash`.
    pub fn from_dependency(descriptor: &DependencyDescriptor, hash: String) -> Self {
        Self {
            extension_id: descriptor.name.clone(),
            loader_name: descriptor.loader_name.clone(),
            virtual_path: descriptor.virtual_path.clone(),
            hash,
        }
    }

    /// Returns `true` if this entry belongs to `extension_id`, ignoring case.
    pub fn matches_id(&self, extension_id: &str) -> bool {
        ids_equal(&self.extension_id, extension_id)
    }
}

/// Case-insensitive extension id equality.
pub fn ids_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Orders extension ids case-insensitively, breaking ties on the exact
/// spelling so the order is total and stable across runs.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
