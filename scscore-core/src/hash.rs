//! SHA-256 digests of weight files.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 hash of in-memory data as lowercase hex.
pub fn sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// First 12 hex characters of a digest, for log lines.
pub fn short_digest(digest: &str) -> &str {
    &digest[..digest.len().min(12)]
}
