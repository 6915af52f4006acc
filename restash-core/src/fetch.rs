use std::time::Duration;

use async_trait::async_trait;
use restash_model::ResourceUri;
use tracing::debug;

use crate::error::{CacheError, Result};

/// Transport seam for retrieving resource bytes.
///
/// The cache owns deduplication, persistence and notification; fetchers own
/// the wire. Implementations carry their own timeout discipline and must be
/// safe to share behind an `Arc` across worker tasks. The cache issues one
/// call per miss and never retries on its own, so a failed call surfaces to
/// observers as "still missing" until somebody requests the URI again.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, uri: &ResourceUri) -> Result<Vec<u8>>;
}

/// `reqwest`-backed fetcher for HTTP(S) resources.
#[derive(Clone, Debug)]
pub struct HttpResourceFetcher {
    client: reqwest::Client,
}

impl HttpResourceFetcher {
    /// Build a fetcher with its own client and a 30 second total timeout.
    pub fn try_new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            // Binary assets only; compression would make Content-Length unverifiable.
            .no_deflate()
            .no_zstd()
            .no_brotli()
            .no_gzip()
            .build()
            .map_err(|err| CacheError::Internal(format!("failed to create HTTP client: {err}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, sharing its pool and timeout settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceFetcher for HttpResourceFetcher {
    async fn fetch(&self, uri: &ResourceUri) -> Result<Vec<u8>> {
        let url = url::Url::parse(uri.as_str())
            .map_err(|err| CacheError::InvalidUri(format!("{uri}: {err}")))?;

        debug!("[fetch] GET {url}");

        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(CacheError::HttpStatus {
                status: response.status(),
                url: url.into(),
            });
        }

        let expected_len = response.content_length();
        let bytes = response.bytes().await?;

        if let Some(content_len) = expected_len
            && bytes.len() as u64 != content_len
        {
            return Err(CacheError::Fetch(format!(
                "resource size mismatch for {url}: got {} bytes, expected {content_len}",
                bytes.len()
            )));
        }

        Ok(bytes.to_vec())
    }
}
