//! Manually toggled freshness flag shared between a writer and a cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::source::InvalidationSource;

/// Freshness of the value guarded by a [`WriteThroughToken`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    /// The cached value reflects the latest write.
    Fresh,
    /// A write has happened (or is about to) since the value was read.
    Stale,
}

/// A freshness flag owned by a component that both writes a backing file
/// and caches a parsed view of it.
///
/// The owner marks the token stale *before* it writes and fresh right after
/// it (re)reads. Registered with a [`MonitoredCache`](crate::MonitoredCache)
/// entry, the token forces the next read after a self-write to repopulate,
/// without depending on the timing of any file-system level watch.
///
/// Clones share state. A new token starts [`TokenState::Stale`].
#[derive(Clone, Debug, Default)]
pub struct WriteThroughToken {
    fresh: Arc<AtomicBool>,
}

impl WriteThroughToken {
    /// Creates a stale token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the guarded value was just read from the backing store.
    pub fn mark_fresh(&self) {
        self.fresh.store(true, Ordering::Release);
    }

    /// Records that the backing store is about to change.
    pub fn mark_stale(&self) {
        self.fresh.store(false, Ordering::Release);
    }

    /// Returns `true` while no write has been announced since the last read.
    pub fn is_current(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    /// Returns the current state.
    pub fn state(&self) -> TokenState {
        if self.is_current() {
            TokenState::Fresh
        } else {
            TokenState::Stale
        }
    }
}

impl InvalidationSource for WriteThroughToken {
    fn has_changed(&self) -> bool {
        !self.is_current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stale() {
        let token = WriteThroughToken::new();
        assert_eq!(token.state(), TokenState::Stale);
        assert!(token.has_changed());
    }

    #[test]
    fn fresh_then_stale() {
        let token = WriteThroughToken::new();
        token.mark_fresh();
        assert!(token.is_current());
        assert!(!token.has_changed());

        token.mark_stale();
        assert_eq!(token.state(), TokenState::Stale);
        assert!(token.has_changed());
    }

    #[test]
    fn clones_share_state() {
        let owner = WriteThroughToken::new();
        let registered = owner.clone();
        owner.mark_fresh();
        assert!(registered.is_current());
        owner.mark_stale();
        assert!(registered.has_changed());
    }
}
