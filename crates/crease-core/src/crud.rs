// ── CRUD collection ──
//
// list/get/create/update/remove/search for one backend collection,
// with an in-memory mirror of the last list response. Listing is
// debounced and cancellable: a new `get_all` aborts the previous one
// (including its pending debounce timer), so the most recent request
// always wins. Closing the collection aborts everything in flight and
// freezes its state.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crease_api::{ApiClient, Page, QueryMap, RequestDescriptor, item_endpoint};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::RecordId;
use crate::notify::Callback;
use crate::stream::MirrorStream;

/// Quiet period before a debounced list request goes out.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Timeout applied to every request the collection makes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Search terms shorter than this never hit the network.
pub const MIN_SEARCH_LEN: usize = 2;

// ── Options ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CrudOptions {
    pub endpoint: String,
    pub id_field: String,
    pub debounce: Duration,
    pub load_on_mount: bool,
    /// Static records to seed the mirror with instead of calling the network.
    pub mock_data: Option<Vec<Value>>,
    pub on_success: Option<Callback<Value>>,
    pub on_error: Option<Callback<CoreError>>,
}

impl CrudOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            id_field: "id".into(),
            debounce: DEFAULT_DEBOUNCE,
            load_on_mount: true,
            mock_data: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn load_on_mount(mut self, load: bool) -> Self {
        self.load_on_mount = load;
        self
    }

    pub fn mock_data(mut self, records: Vec<Value>) -> Self {
        self.mock_data = Some(records);
        self
    }

    pub fn on_success(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&CoreError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }
}

// ── State ────────────────────────────────────────────────────────────

/// Observable state of a [`CrudCollection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrudState {
    /// The mirror: records of the last list response, kept in sync with
    /// server responses to create/update/remove.
    pub items: Arc<Vec<Value>>,
    /// Server-side total reported by the last list response.
    pub total: Option<u64>,
    /// True while any operation is outstanding.
    pub loading: bool,
    pub error: Option<CoreError>,
}

// ── Collection ───────────────────────────────────────────────────────

/// Client-side view of one backend collection. Cheaply cloneable;
/// clones share the mirror. Dropping the last clone closes it.
#[derive(Clone)]
pub struct CrudCollection {
    inner: Arc<CrudInner>,
}

struct CrudInner {
    client: ApiClient,
    options: CrudOptions,
    item_endpoint: String,
    state: watch::Sender<CrudState>,
    /// Parent of every list token; cancelled on close.
    lifecycle: CancellationToken,
    /// Token of the current (or last) `get_all`.
    list_token: Mutex<Option<CancellationToken>>,
    pending: AtomicUsize,
    mounted: AtomicBool,
}

impl Drop for CrudInner {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}

impl CrudCollection {
    /// Create the collection. No IO happens until [`mount()`](Self::mount)
    /// or an explicit operation.
    pub fn new(client: ApiClient, options: CrudOptions) -> Self {
        let (state, _) = watch::channel(CrudState::default());
        Self {
            inner: Arc::new(CrudInner {
                item_endpoint: item_endpoint(&options.endpoint),
                client,
                options,
                state,
                lifecycle: CancellationToken::new(),
                list_token: Mutex::new(None),
                pending: AtomicUsize::new(0),
                mounted: AtomicBool::new(false),
            }),
        }
    }

    pub fn options(&self) -> &CrudOptions {
        &self.inner.options
    }

    pub fn state(&self) -> CrudState {
        self.inner.state.borrow().clone()
    }

    /// Current mirror snapshot.
    pub fn items(&self) -> Arc<Vec<Value>> {
        Arc::clone(&self.inner.state.borrow().items)
    }

    /// Decode the mirror into typed records.
    pub fn items_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, CoreError> {
        self.items()
            .iter()
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| CoreError::Internal(format!("record does not decode: {e}")))
            })
            .collect()
    }

    pub fn subscribe(&self) -> MirrorStream {
        MirrorStream::new(self.inner.state.subscribe())
    }

    /// Token cancelled when this collection closes.
    pub fn lifecycle(&self) -> CancellationToken {
        self.inner.lifecycle.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lifecycle.is_cancelled()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Initial load; runs at most once per collection.
    ///
    /// Seeds the mirror from mock data when configured, otherwise issues
    /// one undebounced `get_all` if `load_on_mount` is set.
    pub async fn mount(&self) -> Result<(), CoreError> {
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Some(ref records) = self.inner.options.mock_data {
            let records = Arc::new(records.clone());
            self.inner.state.send_modify(|s| {
                s.total = u64::try_from(records.len()).ok();
                s.items = records;
            });
            return Ok(());
        }

        if !self.inner.options.load_on_mount {
            return Ok(());
        }

        match self.get_all(QueryMap::new(), true).await {
            Err(CoreError::Cancelled) | Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Abort the in-flight list request and pending debounce timer.
    /// Nothing touches the state afterwards.
    pub fn close(&self) {
        debug!(endpoint = %self.inner.options.endpoint, "closing collection");
        self.inner.lifecycle.cancel();
        let current = self
            .inner
            .list_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = current {
            token.cancel();
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the collection and replace the mirror.
    ///
    /// Cancels any previous `get_all` still debouncing or in flight. The
    /// superseded call resolves to [`CoreError::Cancelled`] without
    /// touching `error`.
    pub async fn get_all(
        &self,
        params: QueryMap,
        skip_debounce: bool,
    ) -> Result<Arc<Vec<Value>>, CoreError> {
        let token = self.next_list_token()?;
        self.begin();

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(CoreError::Cancelled),
            result = self.fetch_list(params, skip_debounce) => result,
        };

        // A response that raced with its own cancellation is discarded too.
        let outcome = match outcome {
            Ok(_) if token.is_cancelled() => Err(CoreError::Cancelled),
            other => other,
        };

        let settled = match outcome {
            Ok(body) => self.settle(Ok(body), |s, body| {
                let page = Page::<Value>::from_value(body.clone()).map_err(CoreError::from)?;
                s.total = Some(page.count);
                s.items = Arc::new(page.items);
                Ok(())
            }),
            Err(CoreError::Cancelled) => {
                debug!(endpoint = %self.inner.options.endpoint, "list request cancelled");
                self.finish();
                Err(CoreError::Cancelled)
            }
            Err(e) => self.settle(Err(e), |_, _| Ok(())),
        };
        settled.map(|()| self.items())
    }

    /// Fetch one record. The mirror is untouched.
    pub async fn get_by_id(&self, id: &RecordId) -> Result<Value, CoreError> {
        self.ensure_open()?;
        let request = item_request(RequestDescriptor::get(self.inner.item_endpoint.as_str()), id);
        self.tracked(self.inner.client.send(&request), |_, _| Ok(()))
            .await
    }

    /// Create a record; the server's version is appended to the mirror.
    pub async fn create(&self, item: &impl Serialize) -> Result<Value, CoreError> {
        self.ensure_open()?;
        let request = RequestDescriptor::post(self.inner.options.endpoint.as_str(), item)
            .map_err(CoreError::from)?
            .timeout(REQUEST_TIMEOUT);
        self.tracked(self.inner.client.send(&request), |s, created| {
            if created.is_null() {
                warn!(endpoint = %self.inner.options.endpoint, "create returned no record; mirror unchanged");
            } else {
                Arc::make_mut(&mut s.items).push(created.clone());
                s.total = s.total.map(|t| t + 1);
            }
            Ok(())
        })
        .await
    }

    /// Update a record; the matching mirror entry becomes the server's version.
    pub async fn update(&self, id: &RecordId, item: &impl Serialize) -> Result<Value, CoreError> {
        self.ensure_open()?;
        let request = RequestDescriptor::put(self.inner.item_endpoint.as_str(), item)
            .map_err(CoreError::from)?;
        let request = item_request(request, id);
        let id_field = self.inner.options.id_field.clone();
        self.tracked(self.inner.client.send(&request), |s, updated| {
            if updated.is_null() {
                warn!(endpoint = %self.inner.options.endpoint, %id, "update returned no record; mirror unchanged");
                return Ok(());
            }
            for record in Arc::make_mut(&mut s.items).iter_mut() {
                if id.matches(record, &id_field) {
                    *record = updated.clone();
                }
            }
            Ok(())
        })
        .await
    }

    /// Delete a record and drop it from the mirror.
    pub async fn remove(&self, id: &RecordId) -> Result<Value, CoreError> {
        self.ensure_open()?;
        let request = item_request(RequestDescriptor::delete(self.inner.item_endpoint.as_str()), id);
        let id_field = self.inner.options.id_field.clone();
        self.tracked(self.inner.client.send(&request), |s, _| {
            let items = Arc::make_mut(&mut s.items);
            let before = items.len();
            items.retain(|record| !id.matches(record, &id_field));
            if items.len() < before {
                s.total = s.total.map(|t| t.saturating_sub(1));
            }
            Ok(())
        })
        .await
    }

    /// Search the collection. Terms under [`MIN_SEARCH_LEN`] characters
    /// return the current mirror without a request; longer ones go through
    /// a debounced `get_all` with `search=<term>` merged into `extra`.
    pub async fn search(
        &self,
        term: &str,
        mut extra: QueryMap,
    ) -> Result<Arc<Vec<Value>>, CoreError> {
        if term.chars().count() < MIN_SEARCH_LEN {
            return Ok(self.items());
        }
        extra.insert("search".into(), term.to_owned());
        self.get_all(extra, false).await
    }

    // ── Internals ────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.is_closed() {
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Cancel the previous list token and install a fresh child of the
    /// lifecycle token.
    fn next_list_token(&self) -> Result<CancellationToken, CoreError> {
        self.ensure_open()?;
        let token = self.inner.lifecycle.child_token();
        let previous = self
            .inner
            .list_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        Ok(token)
    }

    async fn fetch_list(&self, params: QueryMap, skip_debounce: bool) -> Result<Value, CoreError> {
        if !skip_debounce && !self.inner.options.debounce.is_zero() {
            tokio::time::sleep(self.inner.options.debounce).await;
        }
        let request = RequestDescriptor::get(self.inner.options.endpoint.as_str())
            .query_params(params)
            .timeout(REQUEST_TIMEOUT);
        Ok(self.inner.client.send(&request).await?)
    }

    async fn tracked<F, A>(&self, fut: F, apply: A) -> Result<Value, CoreError>
    where
        F: Future<Output = Result<Value, crease_api::Error>>,
        A: FnOnce(&mut CrudState, &Value) -> Result<(), CoreError>,
    {
        self.begin();
        let result = fut.await.map_err(CoreError::from);
        let body = result.clone();
        self.settle(result, apply).and(body)
    }

    fn begin(&self) {
        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        if self.is_closed() {
            return;
        }
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    /// Decrement the outstanding count; clear `loading` when it hits zero.
    fn finish(&self) {
        let remaining = self.inner.pending.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        if remaining == 0 && !self.is_closed() {
            self.inner.state.send_modify(|s| s.loading = false);
        }
    }

    /// Commit an outcome: apply it to the mirror, or store the error, then
    /// run the matching callback. After close nothing is committed.
    fn settle<A>(&self, result: Result<Value, CoreError>, apply: A) -> Result<(), CoreError>
    where
        A: FnOnce(&mut CrudState, &Value) -> Result<(), CoreError>,
    {
        let result = if self.is_closed() {
            result.map(|_| ())
        } else {
            match result {
                Ok(body) => {
                    let mut applied = Ok(());
                    self.inner.state.send_modify(|s| applied = apply(s, &body));
                    applied.map(|()| {
                        if let Some(ref on_success) = self.inner.options.on_success {
                            on_success(&body);
                        }
                    })
                }
                Err(e) => Err(e),
            }
        };

        if let Err(ref e) = result {
            if !self.is_closed() {
                self.inner.state.send_modify(|s| s.error = Some(e.clone()));
                if let Some(ref on_error) = self.inner.options.on_error {
                    on_error(e);
                }
            }
        }

        self.finish();
        result
    }
}

fn item_request(request: RequestDescriptor, id: &RecordId) -> RequestDescriptor {
    request.path_param("id", id).timeout(REQUEST_TIMEOUT)
}
