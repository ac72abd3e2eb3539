//! Content stores: where dependency records and extension sources live.
//!
//! The [`ContentStore`] trait is the seam between the dependency cache and
//! physical storage. [`DiskStore`] serves a directory tree; [`MemoryStore`]
//! keeps everything in process.

#![warn(missing_docs)]

pub mod disk;
pub mod memory;
pub mod store;

pub use disk::{DiskStore, PathWatch};
pub use memory::MemoryStore;
pub use store::ContentStore;
