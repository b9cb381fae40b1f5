//! Content fingerprinting

use sha2::{Digest, Sha256};

/// SHA-256 of `content`, rendered as lowercase hex
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
