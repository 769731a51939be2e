//! Client configuration
//!
//! One place for the API base URL and the few knobs the client has.
//! Values come from defaults, then environment variables; callers (the CLI)
//! apply their own overrides on top.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default REST base URL (local development backend)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Default content language sent with product requests
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default page size requested from the API
pub const DEFAULT_PAGE_LIMIT: u32 = 12;

/// Data status is polled this often unless configured otherwise
pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names
pub mod env_vars {
    pub const API_URL: &str = "MCPMART_API_URL";
    pub const LANGUAGE: &str = "MCPMART_LANGUAGE";
    pub const ITEMS_PER_PAGE: &str = "MCPMART_ITEMS_PER_PAGE";
    pub const TIMEOUT_SECS: &str = "MCPMART_TIMEOUT_SECS";
    pub const STATUS_POLL_SECS: &str = "MCPMART_STATUS_POLL_SECS";
    pub const DATA_DIR: &str = "MCPMART_DATA_DIR";
}

/// Application data directory name
pub const APP_DIR_NAME: &str = "mcpmart";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub api_base_url: String,
    pub language: String,
    pub items_per_page: u32,
    pub request_timeout: Duration,
    pub status_poll_interval: Duration,
    /// Where the local cache database and logs live
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            items_per_page: DEFAULT_PAGE_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
            data_dir: default_data_dir(),
        }
    }
}

/// Platform data dir (e.g. ~/.local/share/mcpmart), or `./.mcpmart`
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_DIR_NAME)))
}

impl ClientConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(env_vars::API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url;
        }
        if let Some(language) = lookup(env_vars::LANGUAGE).filter(|v| !v.trim().is_empty()) {
            config.language = language;
        }
        if let Some(n) = parse_var::<u32>(&lookup, env_vars::ITEMS_PER_PAGE) {
            config.items_per_page = n.max(1);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, env_vars::TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = parse_var::<u64>(&lookup, env_vars::STATUS_POLL_SECS) {
            config.status_poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(dir) = lookup(env_vars::DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        config.api_base_url = normalize_base_url(&config.api_base_url);
        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = normalize_base_url(&url.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Path of the local cache database
    pub fn cache_database_path(&self) -> PathBuf {
        self.data_dir.join("cache.db")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("[Config] Ignoring invalid value for {}: '{}'", key, raw);
            None
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
