use thiserror::Error;

/// Top-level error type for the `crease-api` crate.
///
/// Covers every failure mode of a single backend call: transport,
/// URL construction, HTTP status and body decoding. `crease-core` maps
/// these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// No response received (connection refused, DNS failure, timeout, reset).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API paths: {0}")]
    InvalidBaseUrl(String),

    /// An endpoint template references a parameter that was not supplied.
    #[error("Missing path parameter '{name}' for endpoint {endpoint}")]
    MissingPathParam { name: String, endpoint: String },

    // ── HTTP ────────────────────────────────────────────────────────
    /// The backend rejected the bearer token (or none was sent).
    #[error("Unauthorized -- missing or expired token")]
    Unauthorized,

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying:
    /// a network failure with no response, or a 5xx.
    ///
    /// Builder and redirect errors are local and never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => match e.status() {
                Some(status) => status.is_server_error(),
                None if e.is_builder() || e.is_redirect() => false,
                None => e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
            },
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` for 4xx responses, which are never retried.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
