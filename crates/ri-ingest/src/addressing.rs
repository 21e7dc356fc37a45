//! # Content Addresser
//!
//! Deterministic content hashing. The hash doubles as the in-batch dedup key
//! and the durable storage key, so it must be stable for equal bytes.

use sha2::{Digest, Sha256};

/// Hashes raw image bytes to a lowercase hex digest.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Storage key layout for original uploads: `<hash>/original`. Scaled
/// variants are named by the worker under the same hash prefix.
pub fn original_key(hash: &str) -> String {
    format!("{hash}/original")
}
