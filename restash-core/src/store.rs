use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{CacheError, Result};
use crate::key::CacheKey;

/// File-backed, immutable resource blobs keyed by [`CacheKey`].
///
/// One flat directory, one file per resource, file name equal to the key.
/// There is no metadata file, no index and no TTL: presence of the blob is
/// the entire cache state, and a blob is never rewritten once visible.
#[derive(Clone, Debug)]
pub struct ResourceStore {
    root: PathBuf,
}

impl ResourceStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            CacheError::Storage(format!(
                "failed to create resource cache dir {:?}: {err}",
                self.root
            ))
        })
    }

    pub async fn exists(&self, key: &CacheKey) -> bool {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .unwrap_or(false)
    }

    /// Blocking probe for callers that cannot await (the `request` fast path).
    pub fn exists_sync(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Read the blob for `key`, surfacing a missing file as [`CacheError::NotFound`].
    pub async fn read(&self, key: &CacheKey) -> Result<Vec<u8>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(CacheError::NotFound(
                format!("no cached resource for key {key}"),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Best-effort atomic write (tmp + rename). If the blob already exists,
    /// this is a no-op. A failed stage or rename discards the temp file.
    pub async fn write_if_missing(&self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        self.ensure_root().await?;
        let path = self.path_for(key);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        let tmp = self
            .root
            .join(format!("{key}.tmp-{}", Uuid::new_v4().simple()));

        if let Err(err) = stage_bytes(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err);
        }

        // If another writer won the race, discard our temp.
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Ok(());
        }

        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheError::Storage(format!(
                "failed to move resource blob {tmp:?} -> {path:?}: {err}"
            )));
        }

        Ok(())
    }
}

/// Write and flush `bytes` at `tmp`, closing the file before returning.
async fn stage_bytes(tmp: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(tmp).await.map_err(|err| {
        CacheError::Storage(format!("failed to create temp resource blob {tmp:?}: {err}"))
    })?;
    file.write_all(bytes).await.map_err(|err| {
        CacheError::Storage(format!("failed to write temp resource blob {tmp:?}: {err}"))
    })?;
    file.flush().await.map_err(|err| {
        CacheError::Storage(format!("failed to flush temp resource blob {tmp:?}: {err}"))
    })
}
