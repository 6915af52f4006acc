//! Resource identity and notification types shared across restash crates.
#![allow(missing_docs)]

pub mod event;
pub mod uri;

// Intentionally curated re-exports for downstream consumers.
pub use event::CacheChanged;
pub use uri::ResourceUri;
