//! Embedder-focused snapshot of the crate surface.
//! Prefer importing from this module instead of individual tree nodes when
//! wiring the cache into application code.

pub use crate::cache::ResourceCache;
pub use crate::config::CacheConfig;
pub use crate::error::{CacheError, Result};
pub use crate::fetch::{HttpResourceFetcher, ResourceFetcher};
pub use crate::key::CacheKey;
pub use crate::stats::CacheStatsSnapshot;
pub use crate::store::ResourceStore;
pub use restash_model::{CacheChanged, ResourceUri};
