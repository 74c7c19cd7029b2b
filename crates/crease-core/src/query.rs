// ── Read query ──
//
// Fetches one endpoint whenever its parameters change and exposes the
// `{data, loading, error}` triple through a `watch` channel. Overlapping
// fetches are allowed; a generation counter makes sure only the response
// to the most recent fetch is committed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crease_api::{ApiClient, Page, PathParams, QueryMap, RequestDescriptor};
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;

/// Observable state of a [`ReadQuery`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    /// Last successful response body.
    pub data: Option<Value>,
    pub loading: bool,
    pub error: Option<CoreError>,
}

impl QueryState {
    /// Normalize `data` as a list response.
    pub fn page(&self) -> Option<Result<Page<Value>, CoreError>> {
        self.data
            .clone()
            .map(|data| Page::from_value(data).map_err(CoreError::from))
    }
}

/// The dependencies of a query: path and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub path: PathParams,
    pub query: QueryMap,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path.insert(name.into(), value.to_string());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }
}

/// A GET against one endpoint template, refetched on parameter change.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct ReadQuery {
    inner: Arc<QueryInner>,
}

struct QueryInner {
    client: ApiClient,
    endpoint: String,
    state: watch::Sender<QueryState>,
    generation: AtomicU64,
    last_params: Mutex<Option<QueryParams>>,
}

impl ReadQuery {
    pub fn new(client: ApiClient, endpoint: impl Into<String>) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            inner: Arc::new(QueryInner {
                client,
                endpoint: endpoint.into(),
                state,
                generation: AtomicU64::new(0),
                last_params: Mutex::new(None),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Current state snapshot.
    pub fn state(&self) -> QueryState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.inner.state.subscribe()
    }

    /// Feed new dependencies. Fetches only when they differ from the last
    /// ones (or nothing was fetched yet); returns `None` when skipped.
    pub async fn update(&self, params: QueryParams) -> Option<Result<Value, CoreError>> {
        {
            let mut last = self
                .inner
                .last_params
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if last.as_ref() == Some(&params) {
                return None;
            }
            *last = Some(params.clone());
        }
        Some(self.fetch(params).await)
    }

    /// Fetch again with the last dependencies (or none).
    pub async fn refetch(&self) -> Result<Value, CoreError> {
        let params = self
            .inner
            .last_params
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default();
        self.fetch(params).await
    }

    async fn fetch(&self, params: QueryParams) -> Result<Value, CoreError> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let request = RequestDescriptor::get(self.inner.endpoint.as_str())
            .path_params(params.path)
            .query_params(params.query);
        let result = self
            .inner
            .client
            .send(&request)
            .await
            .map_err(CoreError::from);

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!(
                endpoint = %self.inner.endpoint,
                generation,
                "discarding response to superseded fetch"
            );
            return result;
        }

        self.inner.state.send_modify(|s| {
            match &result {
                Ok(data) => s.data = Some(data.clone()),
                Err(e) => s.error = Some(e.clone()),
            }
            s.loading = false;
        });
        result
    }
}
