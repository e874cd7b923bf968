use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_DIR: &str = ".resto";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout_secs: u64,
    /// Directory holding the persisted session file.
    pub session_dir: PathBuf,
    /// Quiet period before a search term is sent to a list endpoint.
    pub search_debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                     |
    /// |------------------------------|-----------------------------|
    /// | `RESTO_API_URL`              | `http://localhost:8080/api` |
    /// | `RESTO_REQUEST_TIMEOUT_SECS` | `30`                        |
    /// | `RESTO_SESSION_DIR`          | `.resto`                    |
    /// | `RESTO_SEARCH_DEBOUNCE_MS`   | `300`                       |
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let api_url = lookup("RESTO_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout_secs = parse_u64(
            &lookup,
            "RESTO_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let session_dir = lookup("RESTO_SESSION_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_DIR));

        let search_debounce_ms =
            parse_u64(&lookup, "RESTO_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?;

        Ok(Self {
            api_url,
            request_timeout_secs,
            session_dir,
            search_debounce_ms,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> ClientResult<u64> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ClientError::Config(format!("{key} must be a valid u64, got {raw:?}"))),
    }
}
