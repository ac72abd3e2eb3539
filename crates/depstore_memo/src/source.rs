//! Invalidation sources consulted before a memoized value is served.

use std::fmt::Debug;
use std::sync::Arc;

/// Something a [`MonitoredCache`](crate::MonitoredCache) asks "has the
/// data behind this value changed?" before handing out a cached value.
///
/// Implementations must be cheap enough to be called on every cache read
/// and must never panic. Once a source reports a change the entry that owns
/// it is discarded, so a source does not need to latch its answer.
pub trait InvalidationSource: Send + Sync + Debug {
    /// Returns `true` if the value guarded by this source is stale.
    fn has_changed(&self) -> bool;
}

impl<S: InvalidationSource + ?Sized> InvalidationSource for Arc<S> {
    fn has_changed(&self) -> bool {
        (**self).has_changed()
    }
}

impl<S: InvalidationSource + ?Sized> InvalidationSource for Box<S> {
    fn has_changed(&self) -> bool {
        (**self).has_changed()
    }
}

/// A source that is stale as soon as any of its children is stale.
#[derive(Debug, Default)]
pub struct CompositeSource {
    children: Vec<Box<dyn InvalidationSource>>,
}

impl CompositeSource {
    /// Creates an empty composite, which never reports a change.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a child source.
    pub fn push(&mut self, source: Box<dyn InvalidationSource>) {
        self.children.push(source);
    }

    /// Adds a child source, builder style.
    pub fn with(mut self, source: impl InvalidationSource + 'static) -> Self {
        self.children.push(Box::new(source));
        self
    }

    /// Returns the number of child sources.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if there are no child sources.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl InvalidationSource for CompositeSource {
    fn has_changed(&self) -> bool {
        self.children.iter().any(|c| c.has_changed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Default)]
    struct Switch(AtomicBool);

    impl InvalidationSource for Switch {
        fn has_changed(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn empty_composite_never_changes() {
        let composite = CompositeSource::new();
        assert!(composite.is_empty());
        assert!(!composite.has_changed());
    }

    #[test]
    fn composite_changes_when_any_child_does() {
        let a = Arc::new(Switch::default());
        let b = Arc::new(Switch::default());
        let composite = CompositeSource::new()
            .with(Arc::clone(&a))
            .with(Arc::clone(&b));
        assert_eq!(composite.len(), 2);
        assert!(!composite.has_changed());

        b.0.store(true, Ordering::SeqCst);
        assert!(composite.has_changed());
    }

    #[test]
    fn boxed_source_delegates() {
        let switch = Arc::new(Switch::default());
        let boxed: Box<dyn InvalidationSource> = Box::new(Arc::clone(&switch));
        assert!(!boxed.has_changed());
        switch.0.store(true, Ordering::SeqCst);
        assert!(boxed.has_changed());
    }
}
