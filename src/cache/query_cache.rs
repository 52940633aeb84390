//! Keyed read cache with request de-duplication.
//!
//! Every key has at most one fetch in flight. Callers that arrive while it is
//! running await the same shared future, so the fetcher runs once no matter
//! how many readers there are. Invalidation only marks entries stale: the last
//! value stays visible to subscribers until the next fetch replaces it.

use super::query_key::QueryKey;
use crate::metrics::Metrics;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// A fetch failure, kept as text so it can be cloned to every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for QueryError {}

/// Coarse state a subscriber branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched
    Idle,
    /// First fetch in flight, no data yet
    Loading,
    Success,
    Error,
}

/// Snapshot published to subscribers after every transition.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    pub status: QueryStatus,
    /// Last successful value; kept through refetches and errors
    pub data: Option<V>,
    pub error: Option<QueryError>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<V> QueryState<V> {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            is_stale: false,
        }
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, QueryError>>>;

struct InFlight<V: Clone> {
    id: u64,
    future: SharedFetch<V>,
    /// Invalidated after it started; later readers must not join it
    superseded: bool,
}

struct Entry<V: Clone> {
    data: Option<V>,
    error: Option<QueryError>,
    fetched_at: Option<Instant>,
    stale: bool,
    in_flight: Option<InFlight<V>>,
    state_tx: watch::Sender<QueryState<V>>,
}

impl<V: Clone> Entry<V> {
    fn new() -> Self {
        let (state_tx, _) = watch::channel(QueryState::idle());
        Self {
            data: None,
            error: None,
            fetched_at: None,
            stale: false,
            in_flight: None,
            state_tx,
        }
    }

    fn fresh_data(&self, stale_after: Option<Duration>) -> Option<V> {
        if self.stale {
            return None;
        }
        let fetched_at = self.fetched_at?;
        if let Some(window) = stale_after {
            if fetched_at.elapsed() >= window {
                return None;
            }
        }
        self.data.clone()
    }

    fn status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Success
        } else if self.in_flight.is_some() {
            QueryStatus::Loading
        } else {
            QueryStatus::Idle
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(QueryState {
            status: self.status(),
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.in_flight.is_some(),
            is_stale: self.stale,
        });
    }
}

/// Process-wide cache of read results.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone)]
pub struct QueryCache<V: Clone> {
    entries: Arc<Mutex<HashMap<QueryKey, Entry<V>>>>,
    stale_after: Option<Duration>,
    next_fetch_id: Arc<AtomicU64>,
    metrics: Metrics,
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache. With `stale_after = None` values stay fresh until
    /// invalidated.
    pub fn new(stale_after: Option<Duration>) -> Self {
        Self::with_metrics(stale_after, Metrics::new())
    }

    pub fn with_metrics(stale_after: Option<Duration>, metrics: Metrics) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            stale_after,
            next_fetch_id: Arc::new(AtomicU64::new(1)),
            metrics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the fresh cached value for `key`, or fetch it.
    ///
    /// `fetcher` is only called when no fresh value exists and no fetch for
    /// the key is already running. A fetch that was running when the key was
    /// invalidated is not joined; a new one replaces it and the old result is
    /// only returned to its own waiters. It is called while the cache is locked, so
    /// it must only build the future and not touch the cache itself.
    pub async fn query<F, Fut, E>(&self, key: QueryKey, fetcher: F) -> Result<V, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (fetch_id, future) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

            if let Some(data) = entry.fresh_data(self.stale_after) {
                self.metrics.record_cache_hit();
                tracing::trace!(key = %key, "Cache hit");
                return Ok(data);
            }

            let joinable = entry
                .in_flight
                .as_ref()
                .filter(|in_flight| !in_flight.superseded)
                .map(|in_flight| (in_flight.id, in_flight.future.clone()));

            match joinable {
                Some(joined) => {
                    self.metrics.record_cache_join();
                    tracing::trace!(key = %key, "Joining in-flight fetch");
                    joined
                }
                None => {
                    self.metrics.record_cache_miss();
                    if entry.in_flight.is_some() {
                        tracing::trace!(key = %key, "Replacing invalidated fetch");
                    } else {
                        tracing::trace!(key = %key, "Cache miss");
                    }

                    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let future = fetcher()
                        .map(|result| result.map_err(|e| QueryError::new(e.to_string())))
                        .boxed()
                        .shared();

                    entry.in_flight = Some(InFlight {
                        id,
                        future: future.clone(),
                        superseded: false,
                    });
                    entry.stale = false;
                    entry.error = None;
                    entry.publish();
                    (id, future)
                }
            }
        };

        let result = future.await;
        self.settle(&key, fetch_id, &result);
        result
    }

    /// Store the outcome of a fetch. Only the first waiter to get here for a
    /// given fetch writes; the rest find the in-flight slot already cleared.
    fn settle(&self, key: &QueryKey, fetch_id: u64, result: &Result<V, QueryError>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if !matches!(&entry.in_flight, Some(in_flight) if in_flight.id == fetch_id) {
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.error = None;
                entry.fetched_at = Some(Instant::now());
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Query failed");
                entry.error = Some(err.clone());
                entry.stale = true;
            }
        }
        entry.publish();
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.lock();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                if let Some(in_flight) = entry.in_flight.as_mut() {
                    in_flight.superseded = true;
                }
                entry.publish();
                count += 1;
            }
        }
        tracing::debug!(prefix = %prefix, count, "Invalidated queries");
        count
    }

    /// Watch the state of `key`; the receiver sees every transition.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QueryState<V>> {
        let mut entries = self.lock();
        entries
            .entry(key.clone())
            .or_insert_with(Entry::new)
            .state_tx
            .subscribe()
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.lock()
            .get(key)
            .map(|entry| entry.state_tx.receiver_count())
            .unwrap_or(0)
    }

    /// Current state of `key`, if it has ever been queried or watched.
    pub fn state(&self, key: &QueryKey) -> Option<QueryState<V>> {
        self.lock()
            .get(key)
            .map(|entry| entry.state_tx.borrow().clone())
    }

    /// Last value for `key`, fresh or not.
    pub fn get_query_data(&self, key: &QueryKey) -> Option<V> {
        self.lock().get(key).and_then(|entry| entry.data.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock()
            .get(key)
            .map(|entry| entry.fresh_data(self.stale_after).is_none())
            .unwrap_or(true)
    }

    /// Drop every entry. Fetches still in flight finish without storing.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stale_after(&self) -> Option<Duration> {
        self.stale_after
    }
}

impl<V: Clone> fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or(0);
        f.debug_struct("QueryCache")
            .field("stale_after", &self.stale_after)
            .field("entries", &entries)
            .finish()
    }
}
