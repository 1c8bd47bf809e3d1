//! TTL cache with in-flight request coalescing.
//!
//! Each key holds at most one slot: either a `Ready` entry or an `InFlight`
//! shared fetch. Concurrent misses on the same key all await the same fetch,
//! so the upstream sees exactly one call. The fetch runs on its own task and
//! settles the slot itself, so it completes even if every waiter goes away.
//! Failures are never stored.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::descriptor::CacheKey;
use crate::error::FetchError;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

enum Slot<V> {
    Ready(CacheEntry<V>),
    InFlight { generation: u64, fetch: SharedFetch<V> },
}

struct Inner<V> {
    slots: Mutex<HashMap<CacheKey, Slot<V>>>,
    generations: AtomicU64,
}

/// Keyed, TTL-bounded store. Clones share the same state.
pub struct CacheStore<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for CacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Return the fresh entry for `key`, join the fetch already in flight for
    /// it, or start a new one with `produce`. `produce` is only called in the
    /// last case.
    pub async fn resolve<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        produce: F,
    ) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
    {
        let fetch = {
            let mut slots = self.inner.slots.lock().await;
            match slots.get(&key) {
                Some(Slot::Ready(entry)) if entry.is_fresh(Instant::now()) => {
                    debug!("Cache hit for {}", key);
                    return Ok(entry.data.clone());
                }
                Some(Slot::InFlight { fetch, .. }) => {
                    debug!("Joining in-flight fetch for {}", key);
                    fetch.clone()
                }
                _ => {
                    // A stale entry, if any, is superseded by the new fetch.
                    let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed);
                    let fetch = self.spawn_fetch(key.clone(), generation, ttl, produce());
                    slots.insert(
                        key,
                        Slot::InFlight {
                            generation,
                            fetch: fetch.clone(),
                        },
                    );
                    fetch
                }
            }
        };
        fetch.await
    }

    fn spawn_fetch<Fut>(
        &self,
        key: CacheKey,
        generation: u64,
        ttl: Duration,
        produce: Fut,
    ) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
    {
        let store = self.clone();
        let task = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(produce).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Aborted {
                    cause: "fetch panicked".to_string(),
                }),
            };
            store.settle(&key, generation, ttl, &outcome).await;
            outcome
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(FetchError::Aborted {
                    cause: e.to_string(),
                })
            })
        }
        .boxed()
        .shared()
    }

    /// Replace the in-flight slot with a fresh entry, or drop it on failure.
    async fn settle(
        &self,
        key: &CacheKey,
        generation: u64,
        ttl: Duration,
        outcome: &Result<V, FetchError>,
    ) {
        let mut slots = self.inner.slots.lock().await;
        let current = matches!(
            slots.get(key),
            Some(Slot::InFlight { generation: g, .. }) if *g == generation
        );
        if !current {
            return;
        }

        match outcome {
            Ok(data) => {
                slots.insert(
                    key.clone(),
                    Slot::Ready(CacheEntry {
                        data: data.clone(),
                        stored_at: Instant::now(),
                        ttl,
                    }),
                );
            }
            Err(e) => {
                slots.remove(key);
                warn!("Fetch for {} failed, nothing cached: {}", key, e);
            }
        }
    }

    /// Drop expired entries. In-flight slots are never touched.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.inner.slots.lock().await;
        let before = slots.len();
        slots.retain(|_, slot| match slot {
            Slot::Ready(entry) => entry.is_fresh(now),
            Slot::InFlight { .. } => true,
        });
        before - slots.len()
    }

    /// Number of slots, fresh, stale or in flight.
    pub async fn len(&self) -> usize {
        self.inner.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Periodically purge expired entries to bound memory for one-off keys.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    info!("Purged {} expired cache entries", purged);
                }
            }
        })
    }
}
