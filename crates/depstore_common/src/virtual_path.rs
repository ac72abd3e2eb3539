//! Storage-relative logical paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized logical path relative to the root of a content store.
///
/// Virtual paths are independent of the physical layout: a store maps them
/// onto whatever backing it has. The normalized form uses `/` separators,
/// carries no leading `~/` or `/`, and contains no `.` or `..` segments.
/// A `..` that would climb above the root is discarded, so a virtual path
/// can never escape its store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VirtualPath(String);

impl VirtualPath {
    /// Normalizes `raw` into a virtual path.
    pub fn new(raw: &str) -> Self {
        let unified = raw.replace('\\', "/");
        let trimmed = if unified == "~" {
            ""
        } else {
            unified.strip_prefix("~/").unwrap_or(&unified)
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in trimmed.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self(segments.join("/"))
    }

    /// The root of the store.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns the normalized form without the `~/` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the store root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves `relative` against this path.
    pub fn join(&self, relative: &str) -> Self {
        if self.0.is_empty() {
            Self::new(relative)
        } else {
            let relative = if relative == "~" {
                ""
            } else {
                relative.strip_prefix("~/").unwrap_or(relative)
            };
            Self::new(&format!("{}/{}", self.0, relative))
        }
    }

    /// Returns the containing directory, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Returns the final segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.0.is_empty() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Iterates over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl From<String> for VirtualPath {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for VirtualPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<VirtualPath> for String {
    fn from(path: VirtualPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~/{}", self.0)
    }
}

impl fmt::Debug for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPath({self})")
    }
}
