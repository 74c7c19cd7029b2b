//! Shared configuration for crease tools.
//!
//! TOML profiles, token resolution (env + keyring + token file + plaintext)
//! and translation to a `crease_core::ClientFactory`. The CLI layers its
//! flag overrides on top of this.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crease_core::{ClientFactory, RetryPolicy, TokenFile, TokenSource, TransportConfig};

/// Keyring service name; entries are keyed `<profile>/token`.
pub const KEYRING_SERVICE: &str = "crease";

/// Environment variable that overrides the profile's base URL.
pub const BASE_URL_ENV: &str = "CREASE_BASE_URL";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no base URL configured for profile '{profile}'")]
    NoBaseUrl { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Quiet period for debounced list requests, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry delay in milliseconds; doubles per attempt.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            debounce_ms: default_debounce_ms(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

impl Defaults {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_base_ms))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_ms() -> u64 {
    1000
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "https://api.example.com/api/v1").
    pub base_url: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Bearer token (plaintext; prefer keyring, env var or token file).
    pub token: Option<String>,

    /// File holding the current token. Defaults to the per-profile file
    /// under the data directory.
    pub token_file: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "crease", "crease")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("crease");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default token file for a profile.
pub fn default_token_file(profile_name: &str) -> PathBuf {
    let base = project_dirs().map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf());
    base.join("tokens").join(format!("{profile_name}.token"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is fine.
///
/// Environment keys use `__` for nesting, e.g. `CREASE_DEFAULTS__TIMEOUT`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CREASE_").split("__").ignore(&["base_url", "token"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profiles ────────────────────────────────────────────────────────

impl Config {
    /// Name of the profile to use: explicit, then `default_profile`.
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile. An unknown name is an error unless it is the
    /// implicit default, which resolves to an empty profile.
    pub fn profile(&self, requested: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = self.profile_name(requested);
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile.clone())),
            None if requested.is_none() => Ok((name, Profile::default())),
            None => Err(ConfigError::UnknownProfile { profile: name }),
        }
    }
}

// ── Keyring ─────────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))?)
}

pub fn store_keyring_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

/// Remove the profile's keyring entry. Missing entries are fine.
pub fn clear_keyring_token(profile_name: &str) -> Result<(), ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Token resolution ────────────────────────────────────────────────

/// Token chain for one profile, walked on every request:
/// env var named by `token_env`, keyring, token file, plaintext `token`.
pub struct ProfileTokenSource {
    profile_name: String,
    token_env: Option<String>,
    keyring: bool,
    token_file: TokenFile,
    token: Option<SecretString>,
}

impl ProfileTokenSource {
    pub fn new(profile: &Profile, profile_name: &str) -> Self {
        Self {
            profile_name: profile_name.into(),
            token_env: profile.token_env.clone(),
            keyring: true,
            token_file: TokenFile::new(
                profile
                    .token_file
                    .clone()
                    .unwrap_or_else(|| default_token_file(profile_name)),
            ),
            token: profile.token.clone().map(SecretString::from),
        }
    }

    /// Skip the system keyring (headless hosts, tests).
    pub fn without_keyring(mut self) -> Self {
        self.keyring = false;
        self
    }

    pub fn token_file(&self) -> &TokenFile {
        &self.token_file
    }

    /// Walk the chain with a custom environment lookup.
    pub fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<SecretString> {
        if let Some(ref name) = self.token_env {
            if let Some(val) = env(name).filter(|v| !v.is_empty()) {
                return Some(SecretString::from(val));
            }
        }

        if self.keyring {
            let stored = keyring_entry(&self.profile_name)
                .ok()
                .and_then(|entry| entry.get_password().ok());
            if let Some(secret) = stored {
                return Some(SecretString::from(secret));
            }
        }

        match self.token_file.read() {
            Ok(Some(token)) => return Some(token),
            Ok(None) => {}
            Err(e) => {
                debug!(path = %self.token_file.path().display(), error = %e, "token file unreadable");
            }
        }

        self.token.clone()
    }
}

impl fmt::Debug for ProfileTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileTokenSource")
            .field("profile_name", &self.profile_name)
            .field("token_env", &self.token_env)
            .field("keyring", &self.keyring)
            .field("token_file", &self.token_file.path())
            .finish_non_exhaustive()
    }
}

impl TokenSource for ProfileTokenSource {
    fn token(&self) -> Option<SecretString> {
        self.resolve_with(|name| std::env::var(name).ok())
    }
}

// ── Client construction ─────────────────────────────────────────────

/// Base URL for a profile: `CREASE_BASE_URL` wins over the profile.
pub fn resolve_base_url(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| profile.base_url.clone())
        .ok_or_else(|| ConfigError::NoBaseUrl {
            profile: profile_name.into(),
        })
}

/// Build a `ClientFactory` from a profile, no CLI overrides.
pub fn profile_to_client_factory(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientFactory, ConfigError> {
    let base_url = resolve_base_url(profile, profile_name)?;
    let tokens: Arc<dyn TokenSource> = Arc::new(ProfileTokenSource::new(profile, profile_name));
    client_factory(&base_url, profile.timeout.unwrap_or(defaults.timeout), defaults, tokens)
}

/// Build a `ClientFactory` from resolved pieces.
pub fn client_factory(
    base_url: &str,
    timeout_secs: u64,
    defaults: &Defaults,
    tokens: Arc<dyn TokenSource>,
) -> Result<ClientFactory, ConfigError> {
    url::Url::parse(base_url).map_err(|e| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL {base_url}: {e}"),
    })?;

    let transport = TransportConfig::default().with_timeout(Duration::from_secs(timeout_secs));
    let factory = ClientFactory::new(base_url, &transport, tokens).map_err(|e| {
        ConfigError::Validation {
            field: "base_url".into(),
            reason: e.to_string(),
        }
    })?;
    Ok(factory.with_retry(defaults.retry_policy()))
}
