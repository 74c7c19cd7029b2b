//! Data-access layer between `crease-api` and the admin front ends.
//!
//! - **[`ReadQuery`]**: GET an endpoint whenever its parameters change and
//!   expose `{data, loading, error}` through a `watch` channel. Only the
//!   response to the latest fetch is ever committed.
//!
//! - **[`Mutation`]**: on-demand POST / PUT / DELETE with loading/error
//!   state, a [`Notification`] per outcome and optional continuations.
//!
//! - **[`CrudCollection`]**: list/get/create/update/remove/search over one
//!   collection with a debounced, cancellable list request and an
//!   in-memory mirror reconciled from server responses. Observe it with
//!   [`MirrorStream`].
//!
//! - **[`League`]**: session facade handing out all of the above for each
//!   [`Resource`] of the league catalogue, validating payloads first.

pub mod crud;
pub mod error;
pub mod league;
pub mod model;
pub mod mutation;
pub mod notify;
pub mod params;
pub mod query;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use crud::{CrudCollection, CrudOptions, CrudState};
pub use error::CoreError;
pub use league::League;
pub use model::{RecordId, Resource};
pub use mutation::{MessageOverrides, Mutation, MutationOptions, MutationState};
pub use notify::{Callback, ChannelNotifier, Notification, Notifier, TracingNotifier, Variant};
pub use params::{ListParams, SortOrder};
pub use query::{QueryParams, QueryState, ReadQuery};
pub use stream::{MirrorStream, MirrorWatchStream};

// Transport types callers need to build a client.
pub use crease_api::{
    ApiClient, ClientFactory, Page, PathParams, QueryMap, RequestDescriptor, RetryPolicy,
    StaticToken, TokenFile, TokenSource, TransportConfig,
};
