//! Monitored memoization.
//!
//! A [`MonitoredCache`] memoizes values per key. The function that computes
//! a value receives a [`PopulateContext`] on which it registers the
//! [`InvalidationSource`]s the value depends on (file watches, a
//! [`WriteThroughToken`], or a [`CompositeSource`] of several). The cache
//! consults those sources before serving the value again and recomputes it
//! as soon as any of them reports a change.

#![warn(missing_docs)]

pub mod memo;
pub mod source;
pub mod token;

pub use memo::{CacheStats, MonitoredCache, PopulateContext};
pub use source::{CompositeSource, InvalidationSource};
pub use token::{TokenState, WriteThroughToken};
