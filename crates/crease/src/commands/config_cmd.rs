//! Config subcommand handlers.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;

use crease_config::{
    Config, Profile, clear_keyring_token, default_token_file, save_config, store_keyring_token,
};
use crease_core::TokenFile;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn available(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Read a token: hidden prompt on a terminal, first stdin line otherwise.
fn read_token() -> Result<String, CliError> {
    let token = if io::stdin().is_terminal() {
        Password::new()
            .with_prompt("Bearer token")
            .interact()
            .map_err(prompt_err)?
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim().to_owned()
    };
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

fn token_file(profile: &Profile, profile_name: &str) -> TokenFile {
    TokenFile::new(
        profile
            .token_file
            .clone()
            .unwrap_or_else(|| default_token_file(profile_name)),
    )
}

/// Config as shown to the user: plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    for profile in shown.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    shown
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("crease configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let base_url: String = Input::new()
                .with_prompt("API base URL")
                .default("http://localhost:8000/api/v1".into())
                .interact_text()
                .map_err(prompt_err)?;

            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to token file",
                "Save to config file (plaintext)",
                "Skip for now",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the bearer token?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut profile = Profile {
                base_url: Some(base_url),
                ..Profile::default()
            };
            match store_selection {
                0 => {
                    store_keyring_token(&profile_name, &read_token()?)?;
                    eprintln!("   ✓ Token stored in system keyring");
                }
                1 => {
                    let file = token_file(&profile, &profile_name);
                    file.store(&SecretString::from(read_token()?))?;
                    eprintln!("   ✓ Token written to {}", file.path().display());
                }
                2 => profile.token = Some(read_token()?),
                _ => {}
            }

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: crease teams list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let value = serde_json::to_value(&cfg).map_err(|e| CliError::Internal(e.to_string()))?;
            let format = match global.output {
                None | Some(OutputFormat::Table | OutputFormat::Plain) => OutputFormat::Yaml,
                Some(other) => other,
            };
            output::print_output(&output::render_single(format, &value), global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: crease config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort_unstable();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { file } => {
            let cfg = config::load_config_or_default();
            let (profile_name, profile) =
                cfg.profile(global.profile.as_deref())
                    .map_err(|_| CliError::ProfileNotFound {
                        name: cfg.profile_name(global.profile.as_deref()),
                        available: available(&cfg),
                    })?;

            let token = read_token()?;
            if file {
                let target = token_file(&profile, &profile_name);
                target.store(&SecretString::from(token))?;
                eprintln!("✓ Token for '{profile_name}' written to {}", target.path().display());
            } else {
                store_keyring_token(&profile_name, &token)?;
                eprintln!("✓ Token for '{profile_name}' stored in system keyring");
            }
            Ok(())
        }

        // ── ClearToken ──────────────────────────────────────────────
        ConfigCommand::ClearToken => {
            let cfg = config::load_config_or_default();
            let (profile_name, profile) =
                cfg.profile(global.profile.as_deref())
                    .map_err(|_| CliError::ProfileNotFound {
                        name: cfg.profile_name(global.profile.as_deref()),
                        available: available(&cfg),
                    })?;

            token_file(&profile, &profile_name).clear()?;
            if let Err(e) = clear_keyring_token(&profile_name) {
                tracing::warn!(error = %e, "could not clear keyring entry");
            }
            eprintln!("✓ Stored tokens cleared for '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                token: Some("secret".into()),
                ..Profile::default()
            },
        );
        let shown = redacted(&cfg);
        assert_eq!(shown.profiles["default"].token.as_deref(), Some("****"));
    }
}
