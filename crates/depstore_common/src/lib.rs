//! Shared foundational types used across the depstore workspace.
//!
//! This crate provides content hashing for change detection and the
//! normalized virtual path type that names artifacts inside a content store.

#![warn(missing_docs)]

pub mod hash;
pub mod virtual_path;

pub use hash::ContentHash;
pub use virtual_path::VirtualPath;
