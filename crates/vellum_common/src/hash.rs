//! Content fingerprints for compiled artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 fingerprint of a resource's source text.
///
/// Compiled artifacts record the hash of the text they were produced from, so
/// two compilations of the same key can be told apart without comparing the
/// text itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Hashes a byte slice with XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Hashes UTF-8 source text.
    pub fn of_str(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
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
    fn same_text_same_hash() {
        assert_eq!(
            ContentHash::of_str("@page\n<h1>Home</h1>"),
            ContentHash::from_bytes(b"@page\n<h1>Home</h1>")
        );
    }

    #[test]
    fn edited_text_changes_hash() {
        let before = ContentHash::of_str("<h1>Home</h1>");
        let after = ContentHash::of_str("<h1>Home!</h1>");
        assert_ne!(before, after);
    }

    #[test]
    fn display_is_hex() {
        let s = ContentHash::of_str("layout").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::of_str("_ViewStart");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
