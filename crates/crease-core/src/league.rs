// ── League facade ──
//
// One entry point per admin session: owns the API client and the
// notification sink, and hands out queries, mutations and collections
// bound to the catalogue's endpoints.

use std::sync::Arc;
use std::time::Duration;

use crease_api::ApiClient;
use serde_json::Value;
use tracing::debug;

use crate::crud::{CrudCollection, CrudOptions, DEFAULT_DEBOUNCE};
use crate::error::CoreError;
use crate::model::{RecordId, Resource};
use crate::mutation::{MessageOverrides, Mutation, MutationOptions};
use crate::notify::{Notifier, TracingNotifier};
use crate::query::ReadQuery;

#[derive(Clone)]
pub struct League {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    debounce: Duration,
}

impl League {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            notifier: Arc::new(TracingNotifier),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// CRUD collection over `resource`. Not mounted yet.
    pub fn collection(&self, resource: Resource) -> CrudCollection {
        self.collection_with(resource, |options| options)
    }

    /// Like [`collection()`](Self::collection), with a hook to adjust options.
    pub fn collection_with(
        &self,
        resource: Resource,
        configure: impl FnOnce(CrudOptions) -> CrudOptions,
    ) -> CrudCollection {
        let options = configure(CrudOptions::new(resource.path()).debounce(self.debounce));
        CrudCollection::new(self.client.clone(), options)
    }

    /// Read query over the whole collection.
    pub fn list_query(&self, resource: Resource) -> ReadQuery {
        ReadQuery::new(self.client.clone(), resource.path())
    }

    /// Read query over single records; feed it an `id` path parameter.
    pub fn record_query(&self, resource: Resource) -> ReadQuery {
        ReadQuery::new(self.client.clone(), resource.item_path())
    }

    pub fn mutation(&self, options: MutationOptions) -> Mutation {
        Mutation::new(self.client.clone(), Arc::clone(&self.notifier), options)
    }

    /// Validate and create a record.
    pub async fn create(&self, resource: Resource, payload: &Value) -> Result<Value, CoreError> {
        resource.validate(payload)?;
        debug!(%resource, "creating record");
        self.mutation(MutationOptions::default())
            .post_with(resource.path(), payload, messages(resource, "created"))
            .await
    }

    /// Validate and update a record.
    pub async fn update(
        &self,
        resource: Resource,
        id: &RecordId,
        payload: &Value,
    ) -> Result<Value, CoreError> {
        resource.validate(payload)?;
        debug!(%resource, %id, "updating record");
        self.mutation(MutationOptions::default())
            .put_with(resource.path(), id, payload, messages(resource, "updated"))
            .await
    }

    pub async fn delete(&self, resource: Resource, id: &RecordId) -> Result<Value, CoreError> {
        debug!(%resource, %id, "deleting record");
        self.mutation(MutationOptions::default())
            .delete_with(resource.path(), id, messages(resource, "deleted"))
            .await
    }
}

fn messages(resource: Resource, verb: &str) -> MessageOverrides {
    MessageOverrides {
        success: Some(format!("{} {verb} successfully", resource.label())),
        error: Some(format!("{} could not be {verb}", resource.label())),
    }
}
