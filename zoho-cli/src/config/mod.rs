//! Configuration
//!
//! Settings come from built-in defaults, then an optional TOML file. Credential
//! defaults come from the environment (a `.env` file in the working directory
//! is loaded first); CLI flags override both per invocation.

pub mod statuses;

pub use statuses::StatusCatalog;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MODULE, DEFAULT_PAGE_SIZE, DEFAULT_STATUS_FIELD, env,
};
use crate::api::PartialCredentials;

const CONFIG_DIR: &str = "zoho-cli";
const CONFIG_FILE: &str = "config.toml";

/// Settings file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Module whose records are updated (e.g., "Leads")
    pub module: String,
    /// API name of the status field
    pub field: String,
    pub chunk_size: usize,
    pub page_size: u32,
    /// Valid target values; the built-in lead statuses when empty
    pub statuses: Vec<String>,
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            field: DEFAULT_STATUS_FIELD.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            statuses: Vec::new(),
            page_delay_ms: 500,
            timeout_secs: 60,
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
            max_delay_ms: 60_000,
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text; missing keys keep their defaults
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse settings")
    }

    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file does not exist: {}", path.display());
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn status_catalog(&self) -> StatusCatalog {
        if self.statuses.is_empty() {
            StatusCatalog::default()
        } else {
            StatusCatalog::new(self.statuses.iter().cloned())
        }
    }
}

/// `<config dir>/zoho-cli/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load `.env` from the working directory, if present.
///
/// Runs before the logger exists so `RUST_LOG` can come from the file; the
/// caller logs the outcome once logging is up.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Process-wide credential defaults from the environment
pub fn env_credentials() -> PartialCredentials {
    credentials_from(|key| std::env::var(key).ok())
}

fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> PartialCredentials {
    PartialCredentials {
        client_id: lookup(env::CLIENT_ID),
        client_secret: lookup(env::CLIENT_SECRET),
        refresh_token: lookup(env::REFRESH_TOKEN),
        api_domain: lookup(env::API_DOMAIN),
        accounts_url: lookup(env::ACCOUNTS_URL),
    }
}
