use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the fetch pipeline counters.
#[derive(Debug, Clone, Copy)]
pub struct CacheStatsSnapshot {
    pub requests: u64,
    pub warm_hits: u64,
    pub coalesced: u64,
    pub enqueued: u64,
    pub fetches_succeeded: u64,
    pub fetches_failed: u64,
    pub store_failures: u64,
}

#[derive(Debug, Default)]
pub(crate) struct CacheStats {
    requests: AtomicU64,
    warm_hits: AtomicU64,
    coalesced: AtomicU64,
    enqueued: AtomicU64,
    fetches_succeeded: AtomicU64,
    fetches_failed: AtomicU64,
    store_failures: AtomicU64,
}

impl CacheStats {
    pub(crate) fn on_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_warm_hit(&self) {
        self.warm_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_fetch_succeeded(&self) {
        self.fetches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            warm_hits: self.warm_hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            fetches_succeeded: self.fetches_succeeded.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}
