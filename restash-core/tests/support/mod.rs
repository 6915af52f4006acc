//! Shared fetcher doubles and logging setup for cache integration tests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use restash_core::{
    error::{CacheError, Result},
    fetch::ResourceFetcher,
};
use restash_model::{CacheChanged, ResourceUri};
use tokio::sync::{Mutex as AsyncMutex, Semaphore, broadcast};

/// Upper bound on any single wait inside a test.
pub const EVENT_WAIT: Duration = Duration::from_secs(5);

/// Install a fmt subscriber once per test binary; respects `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Receive one change event, panicking after a bounded wait.
pub async fn recv_change(events: &mut broadcast::Receiver<CacheChanged>) {
    tokio::time::timeout(EVENT_WAIT, events.recv())
        .await
        .expect("timed out waiting for a cache change event")
        .expect("event channel closed");
}

/// Poll `cond` until it holds or the bounded wait elapses.
#[allow(dead_code)]
pub async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + EVENT_WAIT;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

/// Fetcher double serving scripted bytes per URI and recording every call.
///
/// URIs without a scripted response fail the fetch, standing in for network
/// errors.
#[derive(Clone, Debug, Default)]
pub struct RecordingFetcher {
    responses: Arc<AsyncMutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<AsyncMutex<Vec<String>>>,
}

impl RecordingFetcher {
    pub async fn insert(&self, uri: &str, bytes: &[u8]) {
        self.responses
            .lock()
            .await
            .insert(uri.to_string(), bytes.to_vec());
    }

    pub async fn call_count(&self, uri: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|recorded| recorded.as_str() == uri)
            .count()
    }
}

#[async_trait]
impl ResourceFetcher for RecordingFetcher {
    async fn fetch(&self, uri: &ResourceUri) -> Result<Vec<u8>> {
        self.calls.lock().await.push(uri.as_str().to_string());
        match self.responses.lock().await.get(uri.as_str()) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(CacheError::Fetch(format!("no scripted response for {uri}"))),
        }
    }
}

/// Fetcher double that parks every call on a gate until the test releases it.
///
/// Invocations are counted before parking, so a test can assert how many
/// fetches started while the gate is still shut.
#[allow(dead_code)]
#[derive(Debug)]
pub struct GatedFetcher {
    started: Arc<AtomicUsize>,
    gate: Arc<Semaphore>,
    bytes: Vec<u8>,
}

#[allow(dead_code)]
impl GatedFetcher {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            started: Arc::new(AtomicUsize::new(0)),
            gate: Arc::new(Semaphore::new(0)),
            bytes: bytes.to_vec(),
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Let one parked fetch proceed.
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl ResourceFetcher for GatedFetcher {
    async fn fetch(&self, _uri: &ResourceUri) -> Result<Vec<u8>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| CacheError::Fetch("gate closed".to_string()))?;
        permit.forget();
        Ok(self.bytes.clone())
    }
}
