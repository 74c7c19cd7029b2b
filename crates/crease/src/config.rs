//! CLI configuration: thin wrapper around `crease_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--base-url, --token, --timeout, --retries).

use std::sync::Arc;

use crease_config::{Config, Defaults, ProfileTokenSource};
use crease_core::{ClientFactory, StaticToken, TokenSource};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use crease_config::{config_path, load_config_or_default};

/// Everything a command needs once flags and config are merged.
pub struct Resolved {
    pub profile_name: String,
    pub factory: ClientFactory,
    pub defaults: Defaults,
}

/// Output format: flag, then config default, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        match config.defaults.output.as_str() {
            "json" => OutputFormat::Json,
            "json-compact" => OutputFormat::JsonCompact,
            "yaml" => OutputFormat::Yaml,
            "plain" => OutputFormat::Plain,
            _ => OutputFormat::Table,
        }
    })
}

/// Build the client factory from the config file, profile and CLI overrides.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let (profile_name, profile) = config
        .profile(global.profile.as_deref())
        .map_err(|_| CliError::ProfileNotFound {
            name: config.profile_name(global.profile.as_deref()),
            available: available_profiles(config),
        })?;

    // 1. Base URL (flag/env > profile)
    let base_url = global
        .base_url
        .clone()
        .or_else(|| profile.base_url.clone())
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;

    // 2. Token (flag/env > profile chain)
    let tokens: Arc<dyn TokenSource> = match global.token {
        Some(ref token) => Arc::new(StaticToken::new(token.clone())),
        None => Arc::new(ProfileTokenSource::new(&profile, &profile_name)),
    };

    // 3. Timeout and retries
    let mut defaults = config.defaults.clone();
    if let Some(retries) = global.retries {
        defaults.max_retries = retries;
    }
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    let factory = crease_config::client_factory(&base_url, timeout, &defaults, tokens)?;
    tracing::debug!(profile = %profile_name, base_url = %factory.base_url(), "resolved client");

    Ok(Resolved {
        profile_name,
        factory,
        defaults,
    })
}

fn available_profiles(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
