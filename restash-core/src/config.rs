use std::path::PathBuf;

use directories::ProjectDirs;
use sha2::Digest;

use crate::error::{CacheError, Result};

/// A single worker drains fetches in request order; raise for parallel fetches.
pub const DEFAULT_WORKER_COUNT: usize = 1;
/// Events are tiny and payload-free; the channel only needs enough slack to
/// ride out a briefly stalled subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Construction knobs for a [`ResourceCache`](crate::cache::ResourceCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding the cached blobs. Created on construction.
    pub root: PathBuf,
    /// Number of background workers draining the fetch queue.
    pub worker_count: usize,
    /// Buffered change events per subscriber before lag kicks in.
    pub event_capacity: usize,
}

impl CacheConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            worker_count: DEFAULT_WORKER_COUNT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Config rooted under the platform cache directory, namespaced by server.
    ///
    /// Clients of different servers must not share blobs even when the path
    /// portions of their URIs collide, so the root is keyed by a digest of
    /// the normalized server URL.
    pub fn for_server(server_url: &str) -> Result<Self> {
        let root = cache_root_for_namespace(&namespace_for_server_url(server_url))?;
        Ok(Self::new(root))
    }
}

fn cache_root_for_namespace(namespace: &str) -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "restash", "restash").ok_or_else(|| {
        CacheError::Internal("failed to resolve a platform cache directory".to_string())
    })?;
    Ok(proj_dirs.cache_dir().join("resources").join(namespace))
}

fn namespace_for_server_url(server_url: &str) -> String {
    let normalized = normalize_server_url(server_url);
    let digest = sha2::Sha256::digest(normalized.as_bytes());
    hex::encode(&digest[..16])
}

fn normalize_server_url(server_url: &str) -> String {
    server_url.trim().trim_end_matches('/').to_ascii_lowercase()
}
