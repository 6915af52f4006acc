//! # restash-core
//!
//! Disk-backed cache for small remote resources (avatars, venue photos,
//! poster art) with deduplicated background fetching and a payload-free
//! change broadcast.
//!
//! ## Overview
//!
//! - **Disk first**: `exists`/`read` answer from a flat blob directory and
//!   never touch the network.
//! - **Fire-and-forget fill**: `request` enqueues a background fetch on
//!   miss, coalescing duplicates so a URI is fetched at most once at a time.
//! - **Broadcast completion**: every settled fetch, success or failure,
//!   publishes one [`CacheChanged`]; subscribers re-probe what they care
//!   about.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use restash_core::prelude::*;
//!
//! # async fn demo() -> restash_core::error::Result<()> {
//! let config = CacheConfig::new("/tmp/restash-demo".into());
//! let fetcher = Arc::new(HttpResourceFetcher::try_new()?);
//! let cache = ResourceCache::try_new(config, fetcher)?;
//!
//! let uri = ResourceUri::new("https://img.example.com/a.png");
//! let mut events = cache.subscribe();
//! if !cache.exists(&uri).await {
//!     cache.request(&uri);
//!     let _ = events.recv().await;
//! }
//! let bytes = cache.read(&uri).await?;
//! # drop(bytes);
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

/// The cache service: request coalescing, workers, notification
pub mod cache;
/// Service construction knobs and cache-root helpers
pub mod config;
/// Error types and the crate-wide `Result`
pub mod error;
/// Byte-fetch seam and the HTTP implementation
pub mod fetch;
/// Deterministic URI-to-filename hashing
pub mod key;
/// Convenience re-exports for embedders
pub mod prelude;
/// Fetch pipeline counters
pub mod stats;
/// Flat-directory blob persistence
pub mod store;

pub use cache::ResourceCache;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use fetch::{HttpResourceFetcher, ResourceFetcher};
pub use key::CacheKey;
pub use restash_model::{CacheChanged, ResourceUri};
pub use stats::CacheStatsSnapshot;
pub use store::ResourceStore;
