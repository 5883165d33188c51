//! Content-hash deduplication gate.
//!
//! Prevents re-embedding documents whose bytes have already been processed.
//! The digest is used purely for change detection, not security. When the
//! index backend persists source hashes (the SQLite backend does), the gate
//! is re-seeded from the index at startup so restarts stay idempotent too.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Compute the hex content digest of raw document bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// In-memory set of already-processed content hashes.
///
/// Guarantees idempotent re-upload: re-submitting identical bytes is a
/// no-op for the write path.
#[derive(Debug, Default)]
pub struct DedupGate {
    seen: HashSet<String>,
}

impl DedupGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate pre-seeded with hashes already known to the index.
    pub fn with_seen(seen: HashSet<String>) -> Self {
        Self { seen }
    }

    /// Has this content hash been processed before?
    pub fn seen(&self, hash: &str) -> bool {
        self.seen.contains(hash)
    }

    /// Record a content hash as processed.
    pub fn mark_seen(&mut self, hash: impl Into<String>) {
        self.seen.insert(hash.into());
    }

    /// Number of distinct hashes recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True when no hashes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash(b"the same bytes");
        let b = content_hash(b"the same bytes");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA-256, hex-encoded
    }

    #[test]
    fn test_content_hash_differs_for_different_bytes() {
        assert_ne!(content_hash(b"alpha"), content_hash(b"beta"));
    }

    #[test]
    fn test_gate_seen_and_mark() {
        let mut gate = DedupGate::new();
        let hash = content_hash(b"document body");

        assert!(!gate.seen(&hash));
        gate.mark_seen(hash.clone());
        assert!(gate.seen(&hash));

        // Marking again is a no-op
        gate.mark_seen(hash.clone());
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn test_gate_seeded_from_index() {
        let hash = content_hash(b"already indexed");
        let mut seen = HashSet::new();
        seen.insert(hash.clone());

        let gate = DedupGate::with_seen(seen);
        assert!(gate.seen(&hash));
        assert!(!gate.seen(&content_hash(b"new content")));
    }
}
