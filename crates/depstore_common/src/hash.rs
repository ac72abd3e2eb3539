//! Content hashing for change detection of extension sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 fingerprint of an artifact's bytes.
///
/// Two artifacts with the same `ContentHash` are assumed to have identical
/// content. The hex form produced by [`Display`](fmt::Display) is what gets
/// recorded in the dependency record, so it must stay stable across releases.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Fingerprints a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Fingerprints UTF-8 text.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Returns the 32-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_hash() {
        let a = ContentHash::from_bytes(b"pub fn activate() {}");
        let b = ContentHash::from_bytes(b"pub fn activate() {}");
        assert_eq!(a, b);
    }

    #[test]
    fn edited_source_changes_hash() {
        let a = ContentHash::from_text("version = 1");
        let b = ContentHash::from_text("version = 2");
        assert_ne!(a, b);
    }

    #[test]
    fn text_and_bytes_agree() {
        assert_eq!(
            ContentHash::from_text("module"),
            ContentHash::from_bytes(b"module")
        );
    }

    #[test]
    fn hex_is_32_lowercase_chars() {
        let h = ContentHash::from_bytes(b"test").to_hex();
        assert_eq!(h.len(), 32);
        assert!(h
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", ContentHash::from_bytes(b"test"));
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with("..)"));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
