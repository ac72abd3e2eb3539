//! The storage abstraction the dependency cache reads and writes through.

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;

use depstore_common::{ContentHash, VirtualPath};
use depstore_memo::InvalidationSource;

/// Maps virtual paths onto some backing storage.
///
/// Implementations are shared between request-handling threads, so every
/// operation takes `&self`. None of them retry; a failing call reports the
/// underlying I/O error to its caller.
pub trait ContentStore: Send + Sync + Debug {
    /// Returns `true` if a file or directory exists at `path`.
    fn path_exists(&self, path: &VirtualPath) -> bool;

    /// Reads the whole file at `path` as UTF-8 text.
    fn read_text(&self, path: &VirtualPath) -> io::Result<String>;

    /// Replaces the file at `path` with `contents`, creating parent
    /// directories as needed.
    fn write_text(&self, path: &VirtualPath, contents: &str) -> io::Result<()>;

    /// Creates the directory at `path` (and its parents) if missing.
    fn ensure_directory(&self, path: &VirtualPath) -> io::Result<()>;

    /// Resolves `relative` against `base`.
    fn resolve_virtual_path(&self, base: &VirtualPath, relative: &str) -> VirtualPath {
        base.join(relative)
    }

    /// Returns where `path` lives physically. Stores without a physical
    /// backing return a path that is only meaningful for display.
    fn map_to_physical_path(&self, path: &VirtualPath) -> PathBuf;

    /// Returns a source that reports a change once the content at `path`
    /// differs from what it is at the time of this call.
    fn watch_for_changes(&self, path: &VirtualPath) -> Box<dyn InvalidationSource>;

    /// Fingerprints the content at `path`.
    fn content_hash(&self, path: &VirtualPath) -> io::Result<ContentHash> {
        self.read_text(path).map(|text| ContentHash::from_text(&text))
    }
}
