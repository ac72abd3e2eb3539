//! The dependency store: persists the dependency record and serves a
//! cached, invalidation-aware view of it.
//!
//! Writes are idempotent: a new record is only written when it differs
//! structurally from the one on disk. Reads go through a
//! [`MonitoredCache`] entry guarded by two sources, a watch on the record
//! file and a [`WriteThroughToken`] the store marks stale right before each
//! of its own writes. External edits are caught by the watch; the store's
//! own writes are caught by the token without waiting on the watch.

use std::sync::Arc;

use depstore_common::VirtualPath;
use depstore_config::{
    DepstoreConfig, DEFAULT_RECORD_PATH, DYNAMIC_EXTENSION_LOADER, PRECOMPILED_EXTENSION_LOADER,
};
use depstore_memo::{CacheStats, MonitoredCache, WriteThroughToken};
use depstore_vfs::ContentStore;
use tracing::{debug, info};

use crate::descriptor::{compare_ids, ActivatedExtensionDescriptor, DependencyDescriptor};
use crate::error::StoreError;
use crate::record::{encode, RecordDocument};

/// Where the record lives and which loaders it tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Virtual path of the dependency record.
    pub record_path: VirtualPath,
    /// The two loader names whose extensions are recorded. Compared exactly.
    pub supported_loaders: [String; 2],
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            record_path: VirtualPath::new(DEFAULT_RECORD_PATH),
            supported_loaders: [
                DYNAMIC_EXTENSION_LOADER.to_string(),
                PRECOMPILED_EXTENSION_LOADER.to_string(),
            ],
        }
    }
}

impl StoreOptions {
    /// Builds options from a loaded configuration.
    pub fn from_config(config: &DepstoreConfig) -> Result<Self, StoreError> {
        let supported_loaders: [String; 2] = config
            .loaders
            .supported
            .clone()
            .try_into()
            .map_err(|found: Vec<String>| StoreError::InvalidOptions {
                reason: format!("expected exactly two loaders, found {}", found.len()),
            })?;
        Ok(Self {
            record_path: VirtualPath::new(&config.storage.record_path),
            supported_loaders,
        })
    }
}

/// Result of [`DependencyStore::store_dependencies`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// A new record was written.
    Written {
        /// Number of entries in the new record.
        entries: usize,
    },
    /// The record on disk already matched; nothing was written.
    Unchanged,
}

/// Persisted, change-detecting record of which artifacts each extension
/// was built from.
///
/// Shareable across threads behind an `Arc`. `store_dependencies` is not
/// meant to run concurrently with itself; if it does, the last write wins.
#[derive(Debug)]
pub struct DependencyStore {
    content: Arc<dyn ContentStore>,
    options: StoreOptions,
    cache: MonitoredCache<VirtualPath, Vec<ActivatedExtensionDescriptor>>,
    token: WriteThroughToken,
}

impl DependencyStore {
    /// Creates a store that keeps its record in `content`.
    pub fn new(content: Arc<dyn ContentStore>, options: StoreOptions) -> Self {
        Self {
            content,
            options,
            cache: MonitoredCache::new(),
            token: WriteThroughToken::new(),
        }
    }

    /// Creates a store using the record path and loaders from `config`.
    pub fn from_config(
        content: Arc<dyn ContentStore>,
        config: &DepstoreConfig,
    ) -> Result<Self, StoreError> {
        Ok(Self::new(content, StoreOptions::from_config(config)?))
    }

    /// Returns the virtual path of the record.
    pub fn record_path(&self) -> &VirtualPath {
        &self.options.record_path
    }

    /// Returns the options this store was created with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Returns `true` if extensions of `loader_name` are recorded.
    pub fn is_supported_loader(&self, loader_name: &str) -> bool {
        self.options
            .supported_loaders
            .iter()
            .any(|l| l == loader_name)
    }

    /// Records the dependencies reported by a compilation pass.
    ///
    /// Descriptors of unsupported loaders are dropped, the rest are sorted
    /// by name (case-insensitive) and paired with `hash_of(descriptor)`,
    /// which is called once per kept descriptor. The record is rewritten
    /// only if the result differs from what is currently stored. Write
    /// failures are returned, never swallowed.
    pub fn store_dependencies<F>(
        &self,
        descriptors: &[DependencyDescriptor],
        mut hash_of: F,
    ) -> Result<StoreOutcome, StoreError>
    where
        F: FnMut(&DependencyDescriptor) -> String,
    {
        let mut supported: Vec<&DependencyDescriptor> = descriptors
            .iter()
            .filter(|d| self.is_supported_loader(&d.loader_name))
            .collect();
        supported.sort_by(|a, b| compare_ids(&a.name, &b.name));

        let document = encode(supported.into_iter().map(|d| (d, hash_of(d))));

        if self.read_document().as_ref() == Some(&document) {
            debug!(
                path = %self.options.record_path,
                entries = document.len(),
                "dependency record unchanged, skipping write"
            );
            return Ok(StoreOutcome::Unchanged);
        }

        let xml = document.to_xml()?;
        // Stale before the write, so a reader racing the write repopulates.
        self.token.mark_stale();
        self.content
            .write_text(&self.options.record_path, &xml)
            .map_err(|source| StoreError::Io {
                path: self.content.map_to_physical_path(&self.options.record_path),
                source,
            })?;

        info!(
            path = %self.options.record_path,
            entries = document.len(),
            dropped = descriptors.len() - document.len(),
            "dependency record written"
        );
        Ok(StoreOutcome::Written {
            entries: document.len(),
        })
    }

    /// Returns the recorded descriptor for `extension_id` (case-insensitive).
    pub fn get_descriptor(
        &self,
        extension_id: &str,
    ) -> Result<Option<ActivatedExtensionDescriptor>, StoreError> {
        let descriptors = self.load_descriptors()?;
        Ok(descriptors
            .iter()
            .find(|d| d.matches_id(extension_id))
            .cloned())
    }

    /// Returns the virtual paths whose changes should trigger recompiling
    /// `extension_id`.
    ///
    /// All extensions share one record, so this is the record path itself
    /// when the extension is recorded under a supported loader, and nothing
    /// otherwise.
    pub fn virtual_path_dependencies(
        &self,
        extension_id: &str,
    ) -> Result<impl Iterator<Item = VirtualPath>, StoreError> {
        let descriptor = self.get_descriptor(extension_id)?;
        let record_path = self.options.record_path.clone();
        Ok(descriptor
            .filter(|d| self.is_supported_loader(&d.loader_name))
            .map(move |_| record_path)
            .into_iter())
    }

    /// Returns every recorded descriptor, reading the record on first use
    /// and again whenever it changed since the last read.
    ///
    /// A missing or malformed record yields an empty list. The only error is
    /// failing to create the record's directory.
    pub fn load_descriptors(&self) -> Result<Arc<Vec<ActivatedExtensionDescriptor>>, StoreError> {
        let path = &self.options.record_path;
        self.cache
            .get_or_populate(path, |ctx| -> Result<_, StoreError> {
                if let Some(dir) = path.parent() {
                    self.content
                        .ensure_directory(&dir)
                        .map_err(|source| StoreError::Io {
                            path: self.content.map_to_physical_path(&dir),
                            source,
                        })?;
                }

                ctx.register_boxed(self.content.watch_for_changes(path));
                self.token.mark_fresh();
                ctx.register(self.token.clone());

                let descriptors = self
                    .read_document()
                    .map(RecordDocument::into_descriptors)
                    .unwrap_or_default();
                debug!(path = %path, entries = descriptors.len(), "dependency record loaded");
                Ok(descriptors)
            })
    }

    /// Returns hit/population counters of the descriptor cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Reads the record currently stored. Missing, unreadable, and malformed
    /// records all read as `None`.
    fn read_document(&self) -> Option<RecordDocument> {
        let path = &self.options.record_path;
        if !self.content.path_exists(path) {
            return None;
        }
        let text = match self.content.read_text(path) {
            Ok(text) => text,
            Err(e) => {
                info!(path = %path, error = %e, "dependency record unreadable, treating as empty");
                return None;
            }
        };
        match RecordDocument::parse(&text) {
            Ok(document) => Some(document),
            Err(e) => {
                info!(path = %path, error = %e, "dependency record malformed, treating as empty");
                None
            }
        }
    }
}
