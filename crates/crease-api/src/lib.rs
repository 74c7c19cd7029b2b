// crease-api: Async Rust client for the cricket-league admin REST API

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod request;
pub mod retry;
pub mod transport;

pub use auth::{StaticToken, TokenFile, TokenSource};
pub use client::{ApiClient, ClientFactory};
pub use envelope::Page;
pub use error::Error;
pub use request::{PathParams, QueryMap, RequestDescriptor, item_endpoint};
pub use retry::RetryPolicy;
pub use transport::TransportConfig;
