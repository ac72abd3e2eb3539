//! Persisted, change-detecting record of extension dependencies.
//!
//! After a compilation pass, loaders report which artifact each extension
//! was built from. [`DependencyStore`] writes those reports, paired with
//! content hashes, to a single XML record and answers later questions such
//! as "what did extension X depend on last time" without re-reading the
//! record unless it changed.

#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod record;
pub mod store;

pub use descriptor::{compare_ids, ids_equal, ActivatedExtensionDescriptor, DependencyDescriptor};
pub use error::{RecordError, StoreError};
pub use record::{decode, encode, RecordDocument, ROOT_ELEMENT};
pub use store::{DependencyStore, StoreOptions, StoreOutcome};
