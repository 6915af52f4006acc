use std::fmt;

use restash_model::ResourceUri;
use sha2::{Digest, Sha256};

/// Stable key locating a resource both in memory and on disk.
///
/// Derived by hashing the raw URI string with SHA-256 and hex-encoding the
/// digest: fixed width, filesystem-safe, deterministic across processes and
/// restarts. The key doubles as the blob's file name, so two URIs share a
/// blob only on a digest collision.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the cache key for a URI.
    pub fn from_uri(uri: &ResourceUri) -> Self {
        let digest = Sha256::digest(uri.as_str().as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.0).finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
