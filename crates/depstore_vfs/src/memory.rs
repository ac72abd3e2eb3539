//! In-process content store.
//!
//! Useful for embedding the dependency cache where no writable directory is
//! available, and for asserting exactly how many physical writes a caller
//! performed.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use depstore_common::VirtualPath;
use depstore_memo::InvalidationSource;

use crate::store::ContentStore;

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<VirtualPath, MemoryFile>,
    dirs: BTreeSet<VirtualPath>,
    next_revision: u64,
}

#[derive(Debug)]
struct MemoryFile {
    text: String,
    revision: u64,
}

impl MemoryState {
    fn revision_of(&self, path: &VirtualPath) -> Option<u64> {
        self.files.get(path).map(|f| f.revision)
    }
}

/// A [`ContentStore`] holding files in memory.
///
/// Every successful [`write_text`](ContentStore::write_text) bumps the
/// file's revision, and watches report a change when the revision they saw
/// is no longer current. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    writes: Arc<AtomicU64>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many writes have succeeded so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent write fail with `PermissionDenied` while set.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Deletes the file at `path`. Returns `true` if it existed.
    pub fn remove(&self, path: &VirtualPath) -> bool {
        self.lock().files.remove(path).is_some()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ContentStore for MemoryStore {
    fn path_exists(&self, path: &VirtualPath) -> bool {
        let state = self.lock();
        path.is_root() || state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn read_text(&self, path: &VirtualPath) -> io::Result<String> {
        self.lock()
            .files
            .get(path)
            .map(|f| f.text.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path} not found")))
    }

    fn write_text(&self, path: &VirtualPath, contents: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("writes to {path} are disabled"),
            ));
        }
        let mut state = self.lock();
        state.next_revision += 1;
        let revision = state.next_revision;
        let mut parent = path.parent();
        while let Some(dir) = parent {
            parent = dir.parent();
            state.dirs.insert(dir);
        }
        state.files.insert(
            path.clone(),
            MemoryFile {
                text: contents.to_string(),
                revision,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn ensure_directory(&self, path: &VirtualPath) -> io::Result<()> {
        let mut state = self.lock();
        let mut current = Some(path.clone());
        while let Some(dir) = current {
            current = dir.parent();
            state.dirs.insert(dir);
        }
        Ok(())
    }

    fn map_to_physical_path(&self, path: &VirtualPath) -> PathBuf {
        PathBuf::from(path.to_string())
    }

    fn watch_for_changes(&self, path: &VirtualPath) -> Box<dyn InvalidationSource> {
        let seen = self.lock().revision_of(path);
        Box::new(RevisionWatch {
            state: Arc::clone(&self.state),
            path: path.clone(),
            seen,
        })
    }
}

/// Watch over one [`MemoryStore`] file, keyed on its revision.
#[derive(Debug)]
struct RevisionWatch {
    state: Arc<Mutex<MemoryState>>,
    path: VirtualPath,
    seen: Option<u64>,
}

impl InvalidationSource for RevisionWatch {
    fn has_changed(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.revision_of(&self.path) != self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depstore_common::ContentHash;

    #[test]
    fn write_then_read() {
        let store = MemoryStore::new();
        let path = VirtualPath::new("Dependencies/a.xml");
        store.write_text(&path, "<x/>").unwrap();
        assert_eq!(store.read_text(&path).unwrap(), "<x/>");
        assert!(store.path_exists(&path));
        assert!(store.path_exists(&VirtualPath::new("Dependencies")));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn resolve_virtual_path_joins_against_base() {
        let store = MemoryStore::new();
        let base = VirtualPath::new("Modules/Blog");
        assert_eq!(
            store.resolve_virtual_path(&base, "bin/Blog.dll"),
            VirtualPath::new("Modules/Blog/bin/Blog.dll")
        );
        assert_eq!(
            store.resolve_virtual_path(&base, "../Pages/Pages.csproj"),
            VirtualPath::new("Modules/Pages/Pages.csproj")
        );
        assert_eq!(
            store.resolve_virtual_path(&VirtualPath::root(), "~/Modules/Blog/Blog.csproj"),
            VirtualPath::new("Modules/Blog/Blog.csproj")
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let store = MemoryStore::new();
        let err = store.read_text(&VirtualPath::new("gone")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn ensure_directory_registers_ancestors() {
        let store = MemoryStore::new();
        store.ensure_directory(&VirtualPath::new("a/b/c")).unwrap();
        assert!(store.path_exists(&VirtualPath::new("a")));
        assert!(store.path_exists(&VirtualPath::new("a/b/c")));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn injected_failures_do_not_count() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let err = store
            .write_text(&VirtualPath::new("x"), "data")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(store.write_count(), 0);
        assert!(!store.path_exists(&VirtualPath::new("x")));

        store.fail_writes(false);
        store.write_text(&VirtualPath::new("x"), "data").unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn watch_fires_on_any_write() {
        let store = MemoryStore::new();
        let path = VirtualPath::new("f");
        store.write_text(&path, "same").unwrap();
        let watch = store.watch_for_changes(&path);
        assert!(!watch.has_changed());
        store.write_text(&path, "same").unwrap();
        assert!(watch.has_changed());
    }

    #[test]
    fn watch_sees_removal() {
        let store = MemoryStore::new();
        let path = VirtualPath::new("f");
        store.write_text(&path, "x").unwrap();
        let watch = store.watch_for_changes(&path);
        assert!(store.remove(&path));
        assert!(watch.has_changed());
    }

    #[test]
    fn default_content_hash_uses_text() {
        let store = MemoryStore::new();
        let path = VirtualPath::new("src/lib.rs");
        store.write_text(&path, "pub mod a;").unwrap();
        assert_eq!(
            store.content_hash(&path).unwrap(),
            ContentHash::from_text("pub mod a;")
        );
    }

    #[test]
    fn clones_share_files() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.write_text(&VirtualPath::new("shared"), "1").unwrap();
        assert_eq!(other.read_text(&VirtualPath::new("shared")).unwrap(), "1");
        assert_eq!(other.write_count(), 1);
    }
}
