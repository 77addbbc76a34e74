//! Credential loading
//!
//! Credentials are resolved in order: an explicit file, then the
//! `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` environment variables, then
//! `~/.s3`. A credentials file holds the access id on its first line and the
//! secret on its second.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the access id
pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable holding the secret key
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Default credentials file name inside the home directory
const DEFAULT_CREDENTIALS_FILE: &str = ".s3";

/// Access id and secret key for one account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_id: String,
    secret: Vec<u8>,
}

impl Credentials {
    pub fn new(access_id: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_id: access_id.into(),
            secret: secret.into(),
        }
    }

    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Read a two-line credentials file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Credentials(format!("Cannot read {}: {e}", path.display()))
        })?;
        let mut lines = content.lines().map(str::trim);
        let access_id = lines.next().filter(|l| !l.is_empty());
        let secret = lines.next().filter(|l| !l.is_empty());

        match (access_id, secret) {
            (Some(access_id), Some(secret)) => Ok(Self::new(access_id, secret.as_bytes())),
            _ => Err(Error::Credentials(format!(
                "{} must contain the access id and the secret key on two lines",
                path.display()
            ))),
        }
    }

    /// Read credentials from variables provided by `lookup`
    ///
    /// Returns `None` unless both variables are set.
    pub fn from_vars<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_id = lookup(ACCESS_KEY_VAR)?;
        let secret = lookup(SECRET_KEY_VAR)?;
        Some(Self::new(access_id, secret.into_bytes()))
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Option<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Resolve credentials using the standard precedence
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok(), default_path())
    }

    fn load_with<F>(path: Option<&Path>, lookup: F, fallback: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading credentials from file");
            return Self::from_file(path);
        }

        if let Some(creds) = Self::from_vars(lookup) {
            tracing::debug!("loading credentials from environment");
            return Ok(creds);
        }

        let fallback = fallback
            .ok_or_else(|| Error::Credentials("Could not determine home directory".into()))?;
        tracing::debug!(path = %fallback.display(), "loading credentials from home directory");
        Self::from_file(&fallback)
    }
}

/// `~/.s3`
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CREDENTIALS_FILE))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_id", &self.access_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
