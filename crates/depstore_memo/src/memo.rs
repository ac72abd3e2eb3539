//! Keyed memoization guarded by invalidation sources.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::source::InvalidationSource;

/// Collects the invalidation sources a population function depends on.
///
/// Passed to the closure given to [`MonitoredCache::get_or_populate`]. Every
/// source registered here is consulted before the resulting value is served
/// again; if any reports a change, the value is recomputed.
#[derive(Debug, Default)]
pub struct PopulateContext {
    sources: Vec<Box<dyn InvalidationSource>>,
}

impl PopulateContext {
    fn new() -> Self {
        Self::default()
    }

    /// Registers a source the value being computed depends on.
    pub fn register(&mut self, source: impl InvalidationSource + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Registers an already boxed source.
    pub fn register_boxed(&mut self, source: Box<dyn InvalidationSource>) {
        self.sources.push(source);
    }

    /// Returns the number of sources registered so far.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

/// Point-in-time counters for a [`MonitoredCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a still-valid entry.
    pub hits: u64,
    /// Successful runs of a population function.
    pub populations: u64,
    /// Entries discarded because a source reported a change or because
    /// they were invalidated explicitly.
    pub invalidations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    populations: AtomicU64,
    invalidations: AtomicU64,
}

#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    sources: Vec<Box<dyn InvalidationSource>>,
}

impl<V> Entry<V> {
    fn is_stale(&self) -> bool {
        self.sources.iter().any(|s| s.has_changed())
    }
}

type Slot<V> = Arc<RwLock<Option<Entry<V>>>>;

/// A memoizing cache whose entries carry their own invalidation sources.
///
/// Each key owns a slot guarded by a read/write lock: readers of a valid
/// entry proceed concurrently, while at most one population runs per key at
/// a time. The map of slots is only locked long enough to find or create a
/// slot, never while populating, so different keys do not block each other.
#[derive(Debug)]
pub struct MonitoredCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    counters: Counters,
}

impl<K, V> MonitoredCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Returns the cached value for `key`, running `populate` first if the
    /// key was never populated or any of its sources reports a change.
    ///
    /// A failed population leaves the key unpopulated and returns the error.
    pub fn get_or_populate<F, E>(&self, key: &K, populate: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&mut PopulateContext) -> Result<V, E>,
    {
        let slot = self.slot(key);

        {
            let entry = slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = self.valid_value(entry.as_ref(), key) {
                return Ok(value);
            }
        }

        let mut entry = slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have repopulated while we waited for the lock.
        if let Some(value) = self.valid_value(entry.as_ref(), key) {
            return Ok(value);
        }
        if entry.take().is_some() {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(?key, "cache entry invalidated by a changed source");
        }

        let mut ctx = PopulateContext::new();
        let value = Arc::new(populate(&mut ctx)?);
        self.counters.populations.fetch_add(1, Ordering::Relaxed);
        debug!(?key, sources = ctx.source_count(), "cache entry populated");

        *entry = Some(Entry {
            value: Arc::clone(&value),
            sources: ctx.sources,
        });
        Ok(value)
    }

    /// Returns the value for `key` if it is populated and still valid,
    /// without populating it.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.get(key)?)
        };
        let entry = slot.read().unwrap_or_else(PoisonError::into_inner);
        entry
            .as_ref()
            .filter(|e| !e.is_stale())
            .map(|e| Arc::clone(&e.value))
    }

    /// Drops the entry for `key`. Returns `true` if an entry was present.
    pub fn invalidate(&self, key: &K) -> bool {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            match slots.get(key) {
                Some(slot) => Arc::clone(slot),
                None => return false,
            }
        };
        let removed = slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if removed {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(?key, "cache entry invalidated explicitly");
        }
        removed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.clear();
    }

    /// Returns the number of keys that currently hold a value.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| {
                slot.read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    /// Returns `true` if no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the hit/population/invalidation counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            populations: self.counters.populations.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    fn valid_value(&self, entry: Option<&Entry<V>>, key: &K) -> Option<Arc<V>> {
        let entry = entry?;
        if entry.is_stale() {
            return None;
        }
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        trace!(?key, "cache hit");
        Some(Arc::clone(&entry.value))
    }
}

impl<K, V> Default for MonitoredCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
