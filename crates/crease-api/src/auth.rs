use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Supplies the bearer token for authenticated requests.
///
/// Clients call [`token()`](Self::token) on every request instead of
/// capturing the value at construction, so a token rotated mid-session
/// reaches every client already handed out.
pub trait TokenSource: Send + Sync + fmt::Debug {
    /// The current token, or `None` when no one is logged in.
    fn token(&self) -> Option<SecretString>;
}

/// A fixed token, e.g. from a CLI flag or environment variable.
#[derive(Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(****)")
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<SecretString> {
        if self.0.expose_secret().is_empty() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

/// A token persisted in a file under a fixed path.
///
/// The login flow writes the file; clients read it on every request.
/// A missing or empty file means "not logged in".
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token, trimming surrounding whitespace.
    pub fn read(&self) -> io::Result<Option<SecretString>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(trimmed.to_owned())))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Persist a token, creating parent directories as needed.
    pub fn store(&self, token: &SecretString) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.expose_secret())
    }

    /// Remove the stored token. Clearing an absent token is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl TokenSource for TokenFile {
    fn token(&self) -> Option<SecretString> {
        match self.read() {
            Ok(token) => token,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "token file unreadable");
                None
            }
        }
    }
}
