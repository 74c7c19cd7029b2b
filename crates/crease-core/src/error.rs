// ── Core error types ──
//
// User-facing errors from crease-core. Consumers never see reqwest or
// serde errors directly; the `From<crease_api::Error>` impl flattens them
// into cloneable variants so they can live in observable state.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    /// The operation was superseded or its owner was closed.
    /// Never stored as an error state.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status behind this error, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::AuthenticationFailed { .. } => Some(401),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<crease_api::Error> for CoreError {
    fn from(err: crease_api::Error) -> Self {
        match err {
            crease_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if let Some(status) = e.status() {
                    CoreError::Api {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            crease_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "missing or expired token".into(),
            },
            crease_api::Error::Http {
                status: 404,
                message,
                ..
            } => CoreError::NotFound { resource: message },
            crease_api::Error::Http {
                status, message, ..
            } => CoreError::Api { status, message },
            crease_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            crease_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Base URL cannot be used for API paths: {url}"),
            },
            crease_api::Error::MissingPathParam { name, endpoint } => {
                CoreError::ValidationFailed {
                    message: format!("missing path parameter '{name}' for {endpoint}"),
                }
            }
            crease_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            crease_api::Error::Encode(e) => {
                CoreError::Internal(format!("Failed to encode request body: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_status() {
        let core = CoreError::from(crease_api::Error::Http {
            status: 503,
            message: "maintenance".into(),
            body: String::new(),
        });
        assert_eq!(
            core,
            CoreError::Api {
                status: 503,
                message: "maintenance".into()
            }
        );
        assert_eq!(core.status(), Some(503));
    }

    #[test]
    fn not_found_and_unauthorized_are_specialized() {
        let nf = CoreError::from(crease_api::Error::Http {
            status: 404,
            message: "Not found.".into(),
            body: String::new(),
        });
        assert!(matches!(nf, CoreError::NotFound { .. }));

        let auth = CoreError::from(crease_api::Error::Unauthorized);
        assert_eq!(auth.status(), Some(401));
        assert!(!auth.is_cancelled());
    }
}
