//! services/dashboard/src/cache/mod.rs
//!
//! The query cache shared by every entity binding.
//!
//! A [`QueryClient`] maps [`QueryKey`]s to the last fetched value of that query.
//! It is created once at startup and handed down explicitly; tests build their
//! own over a fake transport.
//!
//! Guarantees:
//! - at most one request is in flight per key; concurrent readers share it,
//! - a value younger than its stale time is served without a request,
//! - an older value is served at once while a background refresh runs,
//! - an invalidated value is never served again; the next read waits for a
//!   fresh request,
//! - observers are notified whenever an entry changes,
//! - every request is driven by the cache itself, so it completes even when
//!   the caller that started it goes away,
//! - a request is abandoned once no observer and no reader waits on it any
//!   more, and an unobserved entry is evicted `gc_time` later.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use agri_core::{QueryKey, StateError};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiResult};
use crate::config::CacheConfig;

mod query;

pub use query::{Query, QueryState, QueryStatus};

type Erased = Arc<dyn Any + Send + Sync>;
type FetchResult = Result<Erased, ApiError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

/// Per-query settings supplied by the binding that owns the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub stale_time: Duration,
    pub enabled: bool,
}

impl QueryOptions {
    pub fn stale_for(stale_time: Duration) -> Self {
        Self {
            stale_time,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

//=========================================================================================
// Cache Entry
//=========================================================================================

struct Entry {
    data: Option<Erased>,
    error: Option<ApiError>,
    updated_at: Option<Instant>,
    stale_time: Duration,
    invalidated: bool,
    fetcher: Option<Fetcher>,
    in_flight: Option<(u64, SharedFetch)>,
    // Sequence number of the newest fetch whose result may still be applied.
    fetch_seq: u64,
    observers: usize,
    // Direct `fetch`/`refetch` callers currently awaiting `in_flight`.
    waiters: usize,
    detached_at: Option<Instant>,
    cancel: CancellationToken,
    notify: watch::Sender<u64>,
}

enum Freshness {
    Fresh(Erased),
    Stale(Erased),
    Missing,
}

impl Entry {
    fn new(stale_time: Duration) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            data: None,
            error: None,
            updated_at: None,
            stale_time,
            invalidated: false,
            fetcher: None,
            in_flight: None,
            fetch_seq: 0,
            observers: 0,
            waiters: 0,
            detached_at: None,
            cancel: CancellationToken::new(),
            notify,
        }
    }

    fn freshness(&self) -> Freshness {
        match (&self.data, self.updated_at) {
            (Some(data), Some(at)) if !self.invalidated => {
                if at.elapsed() < self.stale_time {
                    Freshness::Fresh(data.clone())
                } else {
                    Freshness::Stale(data.clone())
                }
            }
            _ => Freshness::Missing,
        }
    }

    fn notify(&self) {
        self.notify.send_modify(|version| *version += 1);
    }

    /// Stops driving any pending request and rearms the cancellation token.
    fn abandon_in_flight(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.in_flight = None;
    }
}

//=========================================================================================
// Query Client
//=========================================================================================

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    config: CacheConfig,
}

/// Handle to the shared cache. Cloning is cheap; all clones see the same entries.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

fn erase<T, F, Fut>(fetch: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetch();
        async move { fut.await.map(|value| Arc::new(value) as Erased) }.boxed()
    })
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: Erased) -> ApiResult<Arc<T>> {
    value.downcast::<T>().map_err(|_| {
        ApiError::State(StateError::TypeMismatch {
            key: key.to_string(),
        })
    })
}

fn spawn_detached<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(fut);
        }
        Err(_) => debug!("no async runtime, background cache task skipped"),
    }
}

fn backoff(config: &CacheConfig, attempt: u32) -> Duration {
    config
        .retry_base_delay
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(config.retry_max_delay)
}

async fn fetch_with_retry(key: &QueryKey, fetcher: &Fetcher, config: &CacheConfig) -> FetchResult {
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.retry_attempts => {
                let delay = backoff(config, attempt);
                attempt += 1;
                warn!(%key, attempt, ?delay, error = %e, "query failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(%key, error = %e, "query failed");
                return Err(e);
            }
        }
    }
}

impl QueryClient {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Reads `key` through the cache.
    ///
    /// Fresh values come back without a request. Stale values come back at once
    /// and trigger a background refresh. Missing or invalidated values wait for
    /// the (possibly shared) in-flight request.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_time: Duration,
        fetch: F,
    ) -> ApiResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let (shared, _waiter) = {
            let mut entries = self.inner.entries.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(stale_time));
            entry.fetcher = Some(erase(fetch));
            entry.stale_time = stale_time;

            match entry.freshness() {
                Freshness::Fresh(data) => {
                    debug!(%key, "cache hit");
                    return downcast(&key, data);
                }
                Freshness::Stale(data) => {
                    debug!(%key, "serving stale value, refreshing in background");
                    self.start_fetch(&key, entry);
                    return downcast(&key, data);
                }
                Freshness::Missing => match self.start_fetch(&key, entry) {
                    Some(shared) => (shared, self.register_waiter(&key, entry)),
                    None => return Err(ApiError::State(StateError::Disabled(key.to_string()))),
                },
            }
        };
        downcast(&key, shared.await?)
    }

    /// Registers an observer on `key` and returns its handle.
    ///
    /// The observer keeps the entry alive and is notified on every change. A
    /// disabled query never touches the cache and stays pending.
    pub fn watch<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetch: F) -> Query<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        if !options.enabled {
            debug!(%key, "query disabled");
            return Query::disabled(self.clone());
        }

        let receiver = {
            let mut entries = self.inner.entries.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(options.stale_time));
            entry.fetcher = Some(erase(fetch));
            entry.stale_time = options.stale_time;
            entry.observers += 1;
            entry.detached_at = None;
            let receiver = entry.notify.subscribe();

            if !matches!(entry.freshness(), Freshness::Fresh(_)) {
                self.start_fetch(&key, entry);
            }
            receiver
        };
        Query::observing(self.clone(), key, receiver)
    }

    /// A handle that never fetches and stays pending.
    pub fn disabled<T: Send + Sync + 'static>(&self) -> Query<T> {
        Query::disabled(self.clone())
    }

    /// Marks every entry under `prefix` as invalid. Entries that are currently
    /// observed are refetched right away. Returns the number of entries hit.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries.lock();
        let mut count = 0;
        for (key, entry) in entries.iter_mut().filter(|(k, _)| k.starts_with(prefix)) {
            entry.invalidated = true;
            entry.fetch_seq += 1;
            entry.abandon_in_flight();
            if entry.observers > 0 {
                self.start_fetch(key, entry);
            }
            entry.notify();
            count += 1;
        }
        debug!(%prefix, count, "invalidated queries");
        count
    }

    /// Drops every cached value, for example on sign-out.
    ///
    /// Unobserved entries are removed; observed ones are reset to pending so
    /// their handles stay valid.
    pub fn clear(&self) {
        let mut entries = self.inner.entries.lock();
        for entry in entries.values_mut() {
            entry.abandon_in_flight();
        }
        entries.retain(|_, entry| entry.observers > 0);
        for entry in entries.values_mut() {
            entry.data = None;
            entry.error = None;
            entry.updated_at = None;
            entry.invalidated = false;
            entry.fetch_seq += 1;
            entry.notify();
        }
        info!(kept = entries.len(), "query cache cleared");
    }

    /// The cached value under `key`, if any, without fetching.
    pub fn get_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let data = self.inner.entries.lock().get(key)?.data.clone()?;
        data.downcast::<T>().ok()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.lock().contains_key(key)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //=====================================================================================
    // Internals shared with `Query`
    //=====================================================================================

    /// Joins the in-flight request for `entry` or starts a new one.
    ///
    /// A new request gets a driver task that polls it to completion unless the
    /// entry's cancellation token fires first. Must be called with the entries
    /// lock held; never awaits.
    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry) -> Option<SharedFetch> {
        if let Some((_, shared)) = &entry.in_flight {
            debug!(%key, "joining in-flight request");
            return Some(shared.clone());
        }
        let fetcher = entry.fetcher.clone()?;
        entry.fetch_seq += 1;
        let seq = entry.fetch_seq;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let config = self.inner.config.clone();
        let fetch_key = key.clone();

        debug!(%key, seq, "starting request");
        let shared = async move {
            let result = fetch_with_retry(&fetch_key, &fetcher, &config).await;
            if let Some(inner) = weak.upgrade() {
                QueryClient { inner }.complete(&fetch_key, seq, &result);
            }
            result
        }
        .boxed()
        .shared();

        let token = entry.cancel.clone();
        let driven = shared.clone();
        let driver_key = key.clone();
        spawn_detached(async move {
            tokio::select! {
                _ = token.cancelled() => debug!(key = %driver_key, seq, "request abandoned"),
                _ = driven => {}
            }
        });

        entry.in_flight = Some((seq, shared.clone()));
        entry.notify();
        Some(shared)
    }

    /// Counts the caller as waiting on the entry's request until the returned
    /// guard drops, whether the await finished or was cancelled.
    fn register_waiter(&self, key: &QueryKey, entry: &mut Entry) -> Waiter {
        entry.waiters += 1;
        Waiter {
            client: self.clone(),
            key: key.clone(),
        }
    }

    fn release_waiter(&self, key: &QueryKey) {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.waiters = entry.waiters.saturating_sub(1);
        if entry.waiters == 0 && entry.observers == 0 && entry.in_flight.is_some() {
            debug!(%key, "last reader gone, abandoning request");
            entry.abandon_in_flight();
            entry.detached_at = Some(Instant::now());
            self.schedule_gc(key.clone());
        }
    }

    /// Applies the outcome of request `seq` unless a newer one superseded it.
    fn complete(&self, key: &QueryKey, seq: u64, result: &FetchResult) {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if matches!(entry.in_flight, Some((s, _)) if s == seq) {
            entry.in_flight = None;
        }
        if seq != entry.fetch_seq {
            debug!(%key, seq, "discarding superseded result");
            return;
        }
        match result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.error = None;
                entry.updated_at = Some(Instant::now());
                entry.invalidated = false;
            }
            Err(e) => entry.error = Some(e.clone()),
        }
        entry.notify();
        if entry.observers == 0 {
            entry.detached_at = Some(Instant::now());
            self.schedule_gc(key.clone());
        }
    }

    fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.inner.entries.lock();
        let Some(entry) = entries.get(key) else {
            return QueryState::pending();
        };
        let (data, type_error) = match entry.data.clone().map(|d| downcast::<T>(key, d)) {
            Some(Ok(data)) => (Some(data), None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        };
        QueryState::new(
            data,
            type_error.or_else(|| entry.error.clone()),
            entry.in_flight.is_some(),
            entry.invalidated,
            entry.updated_at,
        )
    }

    /// Forces a request for `key`, joining one already in flight.
    async fn refetch<T: Send + Sync + 'static>(&self, key: &QueryKey) -> ApiResult<Arc<T>> {
        let (shared, _waiter) = {
            let mut entries = self.inner.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return Err(ApiError::State(StateError::Disabled(key.to_string())));
            };
            match self.start_fetch(key, entry) {
                Some(shared) => (shared, self.register_waiter(key, entry)),
                None => return Err(ApiError::State(StateError::Disabled(key.to_string()))),
            }
        };
        downcast(key, shared.await?)
    }

    fn detach(&self, key: &QueryKey) {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.observers = entry.observers.saturating_sub(1);
        if entry.observers == 0 {
            debug!(%key, "last observer detached");
            // Readers still awaiting the request keep it alive and joinable.
            if entry.waiters == 0 {
                entry.abandon_in_flight();
            }
            entry.detached_at = Some(Instant::now());
            self.schedule_gc(key.clone());
        }
    }

    fn schedule_gc(&self, key: QueryKey) {
        let weak = Arc::downgrade(&self.inner);
        let gc_time = self.inner.config.gc_time;
        spawn_detached(async move {
            tokio::time::sleep(gc_time).await;
            if let Some(inner) = weak.upgrade() {
                QueryClient { inner }.collect(&key);
            }
        });
    }

    fn collect(&self, key: &QueryKey) {
        let gc_time = self.inner.config.gc_time;
        let mut entries = self.inner.entries.lock();
        let expired = entries.get(key).is_some_and(|e| {
            e.observers == 0
                && e.waiters == 0
                && e.in_flight.is_none()
                && e.detached_at.is_some_and(|at| at.elapsed() >= gc_time)
        });
        if expired {
            entries.remove(key);
            debug!(%key, "evicted unobserved query");
        }
    }
}

/// Held by a direct reader while it awaits a request.
struct Waiter {
    client: QueryClient,
    key: QueryKey,
}

impl Drop for Waiter {
    fn drop(&mut self) {
        self.client.release_waiter(&self.key);
    }
}
