//! Store key generation for resource identities.

use sha2::{Digest, Sha256};

/// Compute the store key for a `(method, url)` resource identity.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
