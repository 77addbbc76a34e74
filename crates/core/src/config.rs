//! Configuration management
//!
//! This module handles locating, loading and migrating the s3lib configuration
//! file. The file is stored in TOML format at `<config_dir>/s3lib/config.toml`;
//! the directory can be overridden with `S3LIB_CONFIG_DIR`.
//!
//! Changes to schema_version require migration support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_VAR: &str = "S3LIB_CONFIG_DIR";

/// Default service host
pub const DEFAULT_HOST: &str = "s3.amazonaws.com";

/// Default service port
pub const DEFAULT_PORT: u16 = 80;

/// Default number of keys per multi-object delete request
pub const DEFAULT_DELETE_BATCH: usize = 500;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    #[serde(default)]
    pub defaults: Defaults,
}

/// Connection and batching defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect and read timeout, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// `max-keys` sent with every listing request
    #[serde(default)]
    pub list_batch: Option<u32>,

    #[serde(default = "default_delete_batch")]
    pub delete_batch: usize,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_delete_batch() -> usize {
    DEFAULT_DELETE_BATCH
}

impl Defaults {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            timeout_secs: None,
            list_batch: None,
            delete_batch: DEFAULT_DELETE_BATCH,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
        }
    }
}

/// Configuration manager handles locating and loading config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for the default location
    ///
    /// `S3LIB_CONFIG_DIR` wins over the platform configuration directory.
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("s3lib"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the default configuration. Older schema
    /// versions are migrated; newer ones are rejected.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade s3lib.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        if config.defaults.delete_batch == 0 {
            return Err(Error::Config("defaults.delete_batch must be 1 or greater".into()));
        }

        tracing::debug!(path = %self.config_path.display(), "loaded configuration");
        Ok(config)
    }

    fn migrate(&self, mut config: Config) -> Result<Config> {
        // Version 0 files predate [defaults]; serde defaults already fill it in.
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
