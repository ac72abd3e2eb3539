//! Error types for dependency record and store operations.

use std::path::PathBuf;

/// Errors from reading or writing the dependency record format.
///
/// The store never surfaces decode failures to its callers: a record that
/// fails to decode is logged and treated as absent. These errors are
/// returned by the codec functions themselves.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The document contains no root element.
    #[error("dependency record is empty")]
    Empty,

    /// The root element is not `<Dependencies>`.
    #[error("unexpected root element <{found}>, expected <Dependencies>")]
    UnexpectedRoot {
        /// The root element name found.
        found: String,
    },

    /// The document is not well-formed or an entry is missing a field.
    #[error("failed to parse dependency record: {reason}")]
    Parse {
        /// Description of the parse failure.
        reason: String,
    },

    /// The document could not be serialized.
    #[error("failed to serialize dependency record: {reason}")]
    Serialize {
        /// Description of the serialization failure.
        reason: String,
    },
}

/// Errors surfaced by [`DependencyStore`](crate::DependencyStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Writing the record or creating its directory failed.
    #[error("dependency store I/O error at {path}: {source}")]
    Io {
        /// The physical path involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The new record could not be encoded.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The store was configured with an unusable loader set.
    #[error("invalid store options: {reason}")]
    InvalidOptions {
        /// Description of the problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = StoreError::Io {
            path: PathBuf::from("/srv/Dependencies/dependencies.compiled.xml"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let msg = err.to_string();
        assert!(msg.contains("dependency store I/O error"));
        assert!(msg.contains("dependencies.compiled.xml"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn unexpected_root_display() {
        let err = RecordError::UnexpectedRoot {
            found: "Manifest".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected root element <Manifest>, expected <Dependencies>"
        );
    }

    #[test]
    fn record_error_is_transparent_in_store_error() {
        let err: StoreError = RecordError::Serialize {
            reason: "bad tag".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "failed to serialize dependency record: bad tag");
    }

    #[test]
    fn invalid_options_display() {
        let err = StoreError::InvalidOptions {
            reason: "expected two loaders".to_string(),
        };
        assert!(err.to_string().contains("expected two loaders"));
    }
}
