//! Content store backed by a directory on the local filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use depstore_common::{ContentHash, VirtualPath};
use depstore_memo::InvalidationSource;
use tracing::trace;

use crate::store::ContentStore;

/// A [`ContentStore`] rooted at a physical directory.
///
/// The virtual path `~/a/b.xml` maps to `<root>/a/b.xml`.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Creates a store rooted at `root`. The directory does not have to
    /// exist yet; it is created on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the physical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentStore for DiskStore {
    fn path_exists(&self, path: &VirtualPath) -> bool {
        self.map_to_physical_path(path).exists()
    }

    fn read_text(&self, path: &VirtualPath) -> io::Result<String> {
        fs::read_to_string(self.map_to_physical_path(path))
    }

    fn write_text(&self, path: &VirtualPath, contents: &str) -> io::Result<()> {
        let physical = self.map_to_physical_path(path);
        if let Some(parent) = physical.parent() {
            fs::create_dir_all(parent)?;
        }
        trace!(path = %physical.display(), bytes = contents.len(), "writing file");
        fs::write(&physical, contents)
    }

    fn ensure_directory(&self, path: &VirtualPath) -> io::Result<()> {
        fs::create_dir_all(self.map_to_physical_path(path))
    }

    fn map_to_physical_path(&self, path: &VirtualPath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    fn watch_for_changes(&self, path: &VirtualPath) -> Box<dyn InvalidationSource> {
        Box::new(PathWatch::new(self.map_to_physical_path(path)))
    }

    fn content_hash(&self, path: &VirtualPath) -> io::Result<ContentHash> {
        fs::read(self.map_to_physical_path(path)).map(|bytes| ContentHash::from_bytes(&bytes))
    }
}

/// Modification times closer together than this may share a timestamp on
/// coarse filesystems.
const TIMESTAMP_TICK: Duration = Duration::from_secs(2);

/// Watches one physical file.
///
/// The snapshot taken at construction records the file's length,
/// modification time, and content hash. Checks compare metadata first and
/// only re-read the file when the metadata cannot rule out a change: the
/// modification time moved, or it is too recent to exclude a second write
/// within the same timestamp tick. Content decides in those cases, so two
/// writes within the filesystem's timestamp granularity are still told
/// apart and rewriting identical bytes is not a change.
#[derive(Debug)]
pub struct PathWatch {
    path: PathBuf,
    snapshot: Option<Snapshot>,
    settled: AtomicBool,
}

#[derive(Debug)]
struct Snapshot {
    len: u64,
    modified: Option<SystemTime>,
    hash: ContentHash,
}

impl PathWatch {
    /// Snapshots `path` as it is now.
    pub fn new(path: PathBuf) -> Self {
        let snapshot = take_snapshot(&path);
        let settled = snapshot
            .as_ref()
            .is_some_and(|s| is_settled(s.modified, SystemTime::now()));
        Self {
            path,
            snapshot,
            settled: AtomicBool::new(settled),
        }
    }

    /// Returns the watched physical path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InvalidationSource for PathWatch {
    fn has_changed(&self) -> bool {
        let metadata = fs::metadata(&self.path).ok();
        let (snapshot, metadata) = match (&self.snapshot, metadata) {
            (None, None) => return false,
            (Some(snapshot), Some(metadata)) => (snapshot, metadata),
            _ => return true,
        };
        if metadata.len() != snapshot.len {
            return true;
        }
        let modified = metadata.modified().ok();
        if modified == snapshot.modified && self.settled.load(Ordering::Acquire) {
            return false;
        }

        let checked_at = SystemTime::now();
        match fs::read(&self.path) {
            Ok(bytes) if ContentHash::from_bytes(&bytes) == snapshot.hash => {
                // Any later write now lands on a newer timestamp.
                if modified == snapshot.modified && is_settled(modified, checked_at) {
                    self.settled.store(true, Ordering::Release);
                }
                false
            }
            _ => true,
        }
    }
}

/// Unreadable and missing files both snapshot as `None`.
fn take_snapshot(path: &Path) -> Option<Snapshot> {
    let metadata = fs::metadata(path).ok()?;
    let bytes = fs::read(path).ok()?;
    Some(Snapshot {
        len: bytes.len() as u64,
        modified: metadata.modified().ok(),
        hash: ContentHash::from_bytes(&bytes),
    })
}

/// Returns `true` once `now` is at least one tick past `modified`.
fn is_settled(modified: Option<SystemTime>, now: SystemTime) -> bool {
    modified
        .and_then(|m| now.duration_since(m).ok())
        .is_some_and(|age| age >= TIMESTAMP_TICK)
}
