//! Content hashing for rendered output.
//!
//! Rendering is deterministic, so the digest of a rendered file identifies
//! its content: two runs over the same definitions and template produce the
//! same digest.

use sha2::{Digest, Sha256};

/// Hasher for rendered artifact content.
#[derive(Debug, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Creates a new content hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the SHA-256 digest of the content as lowercase hex.
    #[must_use]
    pub fn hash_content(&self, content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }

    /// Compares two digests in constant time.
    #[must_use]
    pub fn hashes_match(hash1: &str, hash2: &str) -> bool {
        if hash1.len() != hash2.len() {
            return false;
        }

        hash1
            .bytes()
            .zip(hash2.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hasher = ContentHasher::new();
        assert_eq!(
            hasher.hash_content(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_content_changes_digest() {
        let hasher = ContentHasher::new();
        let a = hasher.hash_content(b"dt_atmos: 180\n");
        let b = hasher.hash_content(b"dt_atmos: 360\n");

        assert_eq!(a, hasher.hash_content(b"dt_atmos: 180\n"));
        assert!(!ContentHasher::hashes_match(&a, &b));
    }

    #[test]
    fn test_short_hash() {
        let hasher = ContentHasher::new();
        let short = hasher.short_hash("abcdef1234567890abcdef1234567890");

        assert_eq!(short, "abcdef12");
    }

    #[test]
    fn test_hashes_match() {
        assert!(ContentHasher::hashes_match("abc123", "abc123"));
        assert!(!ContentHasher::hashes_match("abc123", "abc124"));
        assert!(!ContentHasher::hashes_match("abc123", "abc12"));
    }
}
