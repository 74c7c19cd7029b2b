// HTTP client for the league backend.
//
// Wraps `reqwest::Client` with base-URL resolution, per-request bearer
// token injection, unified retry, and response decoding. Any 2xx is a
// success; an empty body decodes to JSON `null`.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::TokenSource;
use crate::error::Error;
use crate::request::{QueryMap, RequestDescriptor};
use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;

/// Error body shapes the backend uses: `{"detail": ...}`, `{"message": ...}`
/// or `{"error": ...}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

// ── Factory ──────────────────────────────────────────────────────────

/// Produces clients bound to one base URL and one token source.
///
/// All clients share a connection pool. Whether a client authenticates
/// is decided per client via [`client()`](Self::client).
#[derive(Debug, Clone)]
pub struct ClientFactory {
    http: reqwest::Client,
    base_url: Url,
    token_source: Arc<dyn TokenSource>,
    retry: RetryPolicy,
}

impl ClientFactory {
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        token_source: Arc<dyn TokenSource>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url: Url::parse(base_url)?,
            token_source,
            retry: RetryPolicy::default(),
        })
    }

    /// Default retry policy for every client built from here on.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a client. Authenticated clients read the token on every request.
    pub fn client(&self, authenticated: bool) -> ApiClient {
        ApiClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token_source: authenticated.then(|| Arc::clone(&self.token_source)),
            retry: self.retry,
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async JSON client for the league backend. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token_source: Option<Arc<dyn TokenSource>>,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Wrap an existing `reqwest::Client` without authentication.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            token_source: None,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn is_authenticated(&self) -> bool {
        self.token_source.is_some()
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get(&self, path: &str, query: &QueryMap) -> Result<Value, Error> {
        self.send(&RequestDescriptor::get(path).query_params(query.clone()))
            .await
    }

    pub async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        self.send(&RequestDescriptor::post(path, body)?).await
    }

    pub async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        self.send(&RequestDescriptor::put(path, body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        self.send(&RequestDescriptor::delete(path)).await
    }

    /// Send a request and decode the body into `T`.
    pub async fn send_as<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T, Error> {
        let value = self.send(request).await?;
        serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: value.to_string(),
        })
    }

    /// Send a request under the descriptor's retry policy (or the client's).
    pub async fn send(&self, request: &RequestDescriptor) -> Result<Value, Error> {
        let url = request.resolve_url(&self.base_url)?;
        let policy = request.retry.unwrap_or(self.retry);
        policy.run(|| self.send_once(request, url.clone())).await
    }

    async fn send_once(&self, request: &RequestDescriptor, url: Url) -> Result<Value, Error> {
        debug!("{} {url}", request.method);

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ref source) = self.token_source {
            match source.token() {
                Some(token) => builder = builder.bearer_auth(token.expose_secret()),
                None => trace!("no token available, sending unauthenticated"),
            }
        }

        let resp = builder.send().await?;
        handle_response(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else if status == StatusCode::UNAUTHORIZED {
        Err(Error::Unauthorized)
    } else {
        let raw = resp.text().await.unwrap_or_default();
        Err(parse_error(status, raw))
    }
}

fn parse_error(status: StatusCode, raw: String) -> Error {
    let message = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(|err| err.detail.or(err.message).or(err.error))
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw.chars().take(200).collect()
            }
        });

    Error::Http {
        status: status.as_u16(),
        message,
        body: raw,
    }
}
