use std::{
    any::type_name_of_val,
    collections::HashSet,
    fmt,
    path::Path,
    sync::Arc,
    time::Instant,
};

use restash_model::{CacheChanged, ResourceUri};
use tokio::sync::{Mutex, broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{
    config::CacheConfig,
    error::{CacheError, Result},
    fetch::ResourceFetcher,
    key::CacheKey,
    stats::{CacheStats, CacheStatsSnapshot},
    store::ResourceStore,
};

/// One queued fetch, created by [`ResourceCache::request`].
struct FetchJob {
    uri: ResourceUri,
    key: CacheKey,
    requested_at: Instant,
}

/// State shared between service handles and the fetch workers.
///
/// Workers hold only this struct, never the queue sender, so dropping the
/// last [`ResourceCache`] handle closes the queue and lets the workers
/// drain and exit.
struct CacheInner {
    store: ResourceStore,
    fetcher: Arc<dyn ResourceFetcher>,
    /// Non-blocking fetch coordination (`request` dedupes without awaiting).
    in_flight: std::sync::Mutex<HashSet<CacheKey>>,
    events: broadcast::Sender<CacheChanged>,
    stats: CacheStats,
}

/// Disk-backed cache for small remote resources with deduplicated
/// background fetching.
///
/// The cache prefers local disk, falls back to an asynchronous fetch on
/// miss, and broadcasts a payload-free [`CacheChanged`] after every fetch
/// settles so dependent UI can re-probe and refresh. Handles are cheap
/// clones over shared state; construct one per cache root and pass clones
/// to whatever needs resources.
#[derive(Clone)]
pub struct ResourceCache {
    inner: Arc<CacheInner>,
    queue_tx: mpsc::UnboundedSender<FetchJob>,
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_flight = self
            .inner
            .in_flight
            .lock()
            .ok()
            .map(|guard| guard.len())
            .unwrap_or(0);
        let stats = self.inner.stats.snapshot();

        f.debug_struct("ResourceCache")
            .field("root", &self.inner.store.root())
            .field("fetcher", &type_name_of_val(self.inner.fetcher.as_ref()))
            .field("in_flight_requests", &in_flight)
            .field("requests", &stats.requests)
            .field("warm_hits", &stats.warm_hits)
            .field("coalesced", &stats.coalesced)
            .field("fetches_succeeded", &stats.fetches_succeeded)
            .field("fetches_failed", &stats.fetches_failed)
            .finish()
    }
}

impl ResourceCache {
    /// Create the cache root, spawn the fetch workers and return the
    /// cloneable service handle.
    ///
    /// Requires an ambient Tokio runtime for the workers; calling from
    /// outside one is a construction error, not a panic.
    pub fn try_new(config: CacheConfig, fetcher: Arc<dyn ResourceFetcher>) -> Result<Self> {
        let CacheConfig {
            root,
            worker_count,
            event_capacity,
        } = config;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::Internal(
                "ResourceCache requires a running Tokio runtime".to_string(),
            ));
        }

        std::fs::create_dir_all(&root).map_err(|err| {
            CacheError::Storage(format!("failed to create resource cache dir {root:?}: {err}"))
        })?;

        let (events, _) = broadcast::channel::<CacheChanged>(event_capacity.max(1));
        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<FetchJob>();

        let inner = Arc::new(CacheInner {
            store: ResourceStore::new(root),
            fetcher,
            in_flight: std::sync::Mutex::new(HashSet::new()),
            events,
            stats: CacheStats::default(),
        });

        let worker_count = worker_count.max(1);
        Self::start_fetch_workers(&inner, queue_rx, worker_count);
        info!(
            "Resource fetch queue initialized: workers={}, root={:?}",
            worker_count,
            inner.store.root()
        );

        Ok(Self { inner, queue_tx })
    }

    fn start_fetch_workers(
        inner: &Arc<CacheInner>,
        rx: mpsc::UnboundedReceiver<FetchJob>,
        worker_count: usize,
    ) {
        let rx = Arc::new(Mutex::new(rx));
        for worker_id in 0..worker_count {
            let inner = Arc::clone(inner);
            let rx = Arc::clone(&rx);
            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(job) = job else { break };
                    inner.run_fetch_job(job, worker_id).await;
                }
                debug!("[fetch_worker] Worker {worker_id} exiting (queue closed)");
            });
        }
    }

    /// True when the resource is already on disk. Never triggers a fetch.
    pub async fn exists(&self, uri: &ResourceUri) -> bool {
        self.inner.store.exists(&CacheKey::from_uri(uri)).await
    }

    /// Read the cached bytes for `uri`.
    ///
    /// A miss surfaces as [`CacheError::NotFound`] and does not queue a
    /// fetch; callers that want the resource filled use [`request`](Self::request).
    pub async fn read(&self, uri: &ResourceUri) -> Result<Vec<u8>> {
        self.inner.store.read(&CacheKey::from_uri(uri)).await
    }

    /// Ask for `uri` to be fetched into the cache without blocking the caller.
    ///
    /// Fire-and-forget: returns immediately and never reports an error.
    /// Requests for resources already on disk or already being fetched are
    /// no-ops, so hammering this from view code is safe. Completion, for
    /// success and failure alike, is announced through [`subscribe`](Self::subscribe);
    /// the caller learns the outcome by re-probing. Callable from any
    /// thread, runtime or not.
    pub fn request(&self, uri: &ResourceUri) {
        self.inner.stats.on_request();

        let key = CacheKey::from_uri(uri);
        if self.inner.store.exists_sync(&key) {
            self.inner.stats.on_warm_hit();
            return;
        }

        if !self.inner.try_begin_fetch(&key) {
            self.inner.stats.on_coalesced();
            return;
        }

        let job = FetchJob {
            uri: uri.clone(),
            key: key.clone(),
            requested_at: Instant::now(),
        };

        match self.queue_tx.send(job) {
            Ok(()) => {
                self.inner.stats.on_enqueued();
            }
            Err(err) => {
                warn!("[request] Dropped fetch (queue closed): uri={uri}, err={err}");
                self.inner.finish_fetch(&key);
            }
        }
    }

    /// Subscribe to change notifications.
    ///
    /// One [`CacheChanged`] is broadcast after every fetch attempt settles,
    /// successful or not. The event carries no payload: re-probe with
    /// [`exists`](Self::exists) or [`read`](Self::read) for the URIs you
    /// care about. Dropping the receiver unsubscribes. A receiver that
    /// falls behind observes a `Lagged` error rather than missing state;
    /// treat it as "changed" and re-probe.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheChanged> {
        self.inner.events.subscribe()
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn root(&self) -> &Path {
        self.inner.store.root()
    }

    /// Number of URIs currently queued or mid-fetch.
    pub fn pending_fetches(&self) -> usize {
        self.inner
            .in_flight
            .lock()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }
}

impl CacheInner {
    fn try_begin_fetch(&self, key: &CacheKey) -> bool {
        let Ok(mut set) = self.in_flight.lock() else {
            return false;
        };
        if set.contains(key) {
            return false;
        }
        set.insert(key.clone());
        true
    }

    fn finish_fetch(&self, key: &CacheKey) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(key);
        }
    }

    async fn run_fetch_job(&self, job: FetchJob, worker_id: usize) {
        let FetchJob {
            uri,
            key,
            requested_at,
        } = job;

        // The blob may have landed while the job sat queued (another handle
        // over the same root, or a request racing a just-finished fetch).
        // Skip the wire but settle the job like any other.
        if self.store.exists(&key).await {
            debug!("[fetch_worker] Resource already present: worker={worker_id}, uri={uri}");
        } else {
            match self.fetcher.fetch(&uri).await {
                Ok(bytes) => match self.store.write_if_missing(&key, &bytes).await {
                    Ok(()) => {
                        self.stats.on_fetch_succeeded();
                        debug!(
                            "[fetch_worker] Cached {} bytes: worker={}, uri={}, queued_for={:?}",
                            bytes.len(),
                            worker_id,
                            uri,
                            requested_at.elapsed()
                        );
                    }
                    Err(err) => {
                        self.stats.on_store_failure();
                        warn!(
                            "[fetch_worker] Failed to store fetched resource: worker={worker_id}, uri={uri}, err={err}"
                        );
                    }
                },
                Err(err) => {
                    self.stats.on_fetch_failed();
                    warn!(
                        "[fetch_worker] Background fetch failed: worker={worker_id}, uri={uri}, err={err}"
                    );
                }
            }
        }

        // Clear the in-flight entry before announcing, so a subscriber that
        // reacts by re-requesting this URI starts a fresh fetch instead of
        // coalescing with the attempt that just ended.
        self.finish_fetch(&key);
        let _ = self.events.send(CacheChanged);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use restash_model::ResourceUri;
    use tempfile::tempdir;

    use super::ResourceCache;
    use crate::{
        config::CacheConfig,
        error::{CacheError, Result},
        fetch::ResourceFetcher,
    };

    #[derive(Clone, Default)]
    struct NoopFetcher;

    #[async_trait]
    impl ResourceFetcher for NoopFetcher {
        async fn fetch(&self, _uri: &ResourceUri) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn construction_requires_a_runtime() {
        let dir = tempdir().expect("tempdir");
        let config = CacheConfig::new(dir.path().join("resources"));

        let err = ResourceCache::try_new(config, Arc::new(NoopFetcher))
            .expect_err("no runtime available");
        assert!(matches!(err, CacheError::Internal(_)));
    }

    #[tokio::test]
    async fn construction_creates_the_root_and_starts_idle() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("resources");
        let cache = ResourceCache::try_new(CacheConfig::new(root.clone()), Arc::new(NoopFetcher))
            .expect("cache");

        assert!(root.is_dir());
        assert_eq!(cache.pending_fetches(), 0);
        assert!(!cache.exists(&ResourceUri::new("https://img.example.com/a.png")).await);

        let stats = cache.stats();
        assert_eq!(stats.requests, 0);
        assert_eq!(stats.enqueued, 0);

        let debugged = format!("{cache:?}");
        assert!(debugged.contains("in_flight_requests"));
    }
}
