//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use crease_config::ConfigError;
use crease_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(crease::connection_failed),
        help(
            "Check that the API is running and the base URL is right.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(crease::timeout),
        help("Increase the timeout with --timeout or check the backend.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(crease::auth_failed),
        help(
            "The token is missing or expired.\n\
             Run: crease config set-token --profile {profile}\n\
             Or pass --token / set CREASE_TOKEN."
        )
    )]
    AuthFailed { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource} not found: {message}")]
    #[diagnostic(
        code(crease::not_found),
        help("Run: crease {list_command} to see what exists")
    )]
    NotFound {
        resource: String,
        message: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(crease::api_error))]
    ApiError { status: u16, message: String },

    #[error("Request was cancelled")]
    #[diagnostic(code(crease::cancelled))]
    Cancelled,

    #[error("Internal error: {0}")]
    #[diagnostic(code(crease::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(crease::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(crease::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: crease config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No base URL configured")]
    #[diagnostic(
        code(crease::no_config),
        help(
            "Create a profile with: crease config init\n\
             Or pass --base-url / set CREASE_BASE_URL.\n\
             Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(crease::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(crease::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoConfig { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoBaseUrl { .. } => Self::NoConfig {
                path: crease_config::config_path().display().to_string(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl CliError {
    /// Translate a core error with the resource and profile in hand.
    pub fn from_core(err: CoreError, resource: &str, profile: &str) -> Self {
        match err {
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed {
                profile: profile.into(),
            },
            CoreError::NotFound { resource: message } => Self::NotFound {
                resource: resource.into(),
                message,
                list_command: format!("{resource} list"),
            },
            other => other.into(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed {
                profile: "default".into(),
            },
            CoreError::NotFound { resource } => Self::NotFound {
                resource: "record".into(),
                message: resource,
                list_command: "<resource> list".into(),
            },
            CoreError::Api { status, message } => Self::ApiError { status, message },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Cancelled => Self::Cancelled,
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}
