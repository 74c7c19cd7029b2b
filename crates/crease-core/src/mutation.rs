// ── Mutations ──
//
// On-demand POST / PUT / DELETE with loading/error tracking, a
// notification per outcome, and optional success/error continuations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crease_api::{ApiClient, RequestDescriptor, item_endpoint};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::RecordId;
use crate::notify::{Callback, Notification, Notifier};

/// Observable state of a [`Mutation`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationState {
    pub loading: bool,
    pub error: Option<CoreError>,
}

/// Messages and continuations shared by every call of a [`Mutation`].
#[derive(Clone)]
pub struct MutationOptions {
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub on_success: Option<Callback<Value>>,
    pub on_error: Option<Callback<CoreError>>,
    /// Emit notifications at all.
    pub notify: bool,
}

impl Default for MutationOptions {
    fn default() -> Self {
        Self {
            success_message: None,
            error_message: None,
            on_success: None,
            on_error: None,
            notify: true,
        }
    }
}

impl MutationOptions {
    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
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

    pub fn silent(mut self) -> Self {
        self.notify = false;
        self
    }
}

/// Per-call message overrides.
#[derive(Debug, Clone, Default)]
pub struct MessageOverrides {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Performs mutating calls on demand.
///
/// Calls may overlap; `loading` stays set until the last one settles.
pub struct Mutation {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    options: MutationOptions,
    state: watch::Sender<MutationState>,
    pending: AtomicUsize,
}

impl Mutation {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>, options: MutationOptions) -> Self {
        let (state, _) = watch::channel(MutationState::default());
        Self {
            client,
            notifier,
            options,
            state,
            pending: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    pub async fn post(&self, endpoint: &str, body: &impl Serialize) -> Result<Value, CoreError> {
        self.post_with(endpoint, body, MessageOverrides::default())
            .await
    }

    pub async fn post_with(
        &self,
        endpoint: &str,
        body: &impl Serialize,
        messages: MessageOverrides,
    ) -> Result<Value, CoreError> {
        let request = RequestDescriptor::post(endpoint, body).map_err(CoreError::from)?;
        self.run(request, messages, "Created successfully").await
    }

    /// PUT to the item endpoint of `collection`.
    pub async fn put(
        &self,
        collection: &str,
        id: &RecordId,
        body: &impl Serialize,
    ) -> Result<Value, CoreError> {
        self.put_with(collection, id, body, MessageOverrides::default())
            .await
    }

    pub async fn put_with(
        &self,
        collection: &str,
        id: &RecordId,
        body: &impl Serialize,
        messages: MessageOverrides,
    ) -> Result<Value, CoreError> {
        let request = RequestDescriptor::put(item_endpoint(collection), body)
            .map_err(CoreError::from)?
            .path_param("id", id);
        self.run(request, messages, "Updated successfully").await
    }

    /// DELETE the item endpoint of `collection`.
    pub async fn delete(&self, collection: &str, id: &RecordId) -> Result<Value, CoreError> {
        self.delete_with(collection, id, MessageOverrides::default())
            .await
    }

    pub async fn delete_with(
        &self,
        collection: &str,
        id: &RecordId,
        messages: MessageOverrides,
    ) -> Result<Value, CoreError> {
        let request = RequestDescriptor::delete(item_endpoint(collection)).path_param("id", id);
        self.run(request, messages, "Deleted successfully").await
    }

    async fn run(
        &self,
        request: RequestDescriptor,
        messages: MessageOverrides,
        default_success: &str,
    ) -> Result<Value, CoreError> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.client.send(&request).await.map_err(CoreError::from);

        let idle = self.pending.fetch_sub(1, Ordering::SeqCst) == 1;
        self.state.send_modify(|s| {
            s.loading = !idle;
            if let Err(ref err) = result {
                s.error = Some(err.clone());
            }
        });

        match &result {
            Ok(body) => {
                if self.options.notify {
                    let title = messages
                        .success
                        .or_else(|| self.options.success_message.clone())
                        .unwrap_or_else(|| default_success.to_owned());
                    self.notifier.notify(Notification::success(title));
                }
                if let Some(ref on_success) = self.options.on_success {
                    on_success(body);
                }
            }
            Err(err) => {
                if self.options.notify {
                    let title = messages
                        .error
                        .or_else(|| self.options.error_message.clone())
                        .unwrap_or_else(|| "Request failed".to_owned());
                    self.notifier
                        .notify(Notification::error(title, err.to_string()));
                }
                if let Some(ref on_error) = self.options.on_error {
                    on_error(err);
                }
            }
        }

        result
    }
}
