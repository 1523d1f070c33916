//! Observer handles over cache entries.

use std::marker::PhantomData;
use std::sync::Arc;

use agri_core::{QueryKey, StateError};
use tokio::sync::watch;
use tokio::time::Instant;

use super::QueryClient;
use crate::api::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No value and no error yet (or the query is disabled).
    Pending,
    Success,
    Error,
}

/// A point-in-time view of one query.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<ApiError>,
    pub is_fetching: bool,
    /// The value was invalidated and a fresh one has not arrived yet.
    pub invalidated: bool,
    pub updated_at: Option<Instant>,
}

impl<T> QueryState<T> {
    pub(super) fn pending() -> Self {
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
            is_fetching: false,
            invalidated: false,
            updated_at: None,
        }
    }

    pub(super) fn new(
        data: Option<Arc<T>>,
        error: Option<ApiError>,
        is_fetching: bool,
        invalidated: bool,
        updated_at: Option<Instant>,
    ) -> Self {
        let status = match (&data, &error) {
            (_, Some(_)) => QueryStatus::Error,
            (Some(_), None) => QueryStatus::Success,
            (None, None) => QueryStatus::Pending,
        };
        Self {
            status,
            data,
            error,
            is_fetching,
            invalidated,
            updated_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }
}

/// A live subscription to one cache entry.
///
/// While the handle exists the entry is kept and refreshed; dropping the last
/// handle for a key starts its eviction timer.
pub struct Query<T> {
    client: QueryClient,
    key: Option<QueryKey>,
    receiver: Option<watch::Receiver<u64>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Query<T> {
    pub(super) fn observing(
        client: QueryClient,
        key: QueryKey,
        receiver: watch::Receiver<u64>,
    ) -> Self {
        Self {
            client,
            key: Some(key),
            receiver: Some(receiver),
            _marker: PhantomData,
        }
    }

    pub(super) fn disabled(client: QueryClient) -> Self {
        Self {
            client,
            key: None,
            receiver: None,
            _marker: PhantomData,
        }
    }

    /// `None` for a disabled query.
    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    pub fn state(&self) -> QueryState<T> {
        match &self.key {
            Some(key) => self.client.snapshot(key),
            None => QueryState::pending(),
        }
    }

    pub fn data(&self) -> Option<Arc<T>> {
        self.state().data
    }

    /// Waits for the next change to the entry. Never resolves for a disabled query.
    pub async fn changed(&mut self) {
        match self.receiver.as_mut() {
            Some(receiver) => {
                if receiver.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Waits until the query has a value or has finally failed.
    pub async fn wait(&mut self) -> ApiResult<Arc<T>> {
        let Some(key) = self.key.clone() else {
            return Err(ApiError::State(StateError::Disabled("disabled query".to_string())));
        };
        loop {
            let state = self.state();
            if !state.is_fetching {
                return match (state.data, state.error) {
                    (_, Some(error)) => Err(error),
                    (Some(data), None) if !state.invalidated => Ok(data),
                    // Nothing usable and nothing in flight, e.g. after a cache clear.
                    _ => self.client.refetch(&key).await,
                };
            }
            if let (Some(data), None, false) = (&state.data, &state.error, state.invalidated) {
                return Ok(data.clone());
            }
            self.changed().await;
        }
    }

    /// Manual retry: requests the value again regardless of staleness.
    pub async fn refetch(&self) -> ApiResult<Arc<T>> {
        match &self.key {
            Some(key) => self.client.refetch(key).await,
            None => Err(ApiError::State(StateError::Disabled("disabled query".to_string()))),
        }
    }
}

impl<T> Drop for Query<T> {
    fn drop(&mut self) {
        if let Some(key) = &self.key {
            self.client.detach(key);
        }
    }
}
