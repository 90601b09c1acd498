//! Client configuration
//!
//! Settings can come from defaults, environment variables, or a TOML file:
//!
//! | Field | Default | Env var |
//! |-------|---------|---------|
//! | `api_base_url` | `http://localhost:8000` | `ECOPLANTA_API_URL` |
//! | `asset_host` | `http://localhost:5173` | `ECOPLANTA_ASSET_HOST` |
//! | `base_path` | `/` | `ECOPLANTA_BASE_PATH` |
//! | `timeout_ms` | `5000` | `ECOPLANTA_TIMEOUT_MS` |

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default live API location
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default host serving the static snapshots
pub const DEFAULT_ASSET_HOST: &str = "http://localhost:5173";

/// Default bound on a live call
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Directory under the deployment base path holding the snapshots
const SNAPSHOT_DIR: &str = "api/";

/// Env var names
pub mod env {
    /// Live API base URL
    pub const API_URL: &str = "ECOPLANTA_API_URL";
    /// Static asset host
    pub const ASSET_HOST: &str = "ECOPLANTA_ASSET_HOST";
    /// Deployment base path of the dashboard
    pub const BASE_PATH: &str = "ECOPLANTA_BASE_PATH";
    /// Live call bound in milliseconds
    pub const TIMEOUT_MS: &str = "ECOPLANTA_TIMEOUT_MS";
}

/// Settings for the caching/query layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached entries
    pub max_capacity: u64,
    /// Lifetime of entries fetched from the live API
    pub live_ttl_ms: u64,
    /// Lifetime of entries served from a fallback snapshot
    pub fallback_ttl_ms: u64,
    /// Retries after a retryable failure
    pub retries: u32,
    /// Base delay between retries (multiplied by attempt number)
    pub retry_backoff_ms: u64,
}

impl CacheConfig {
    /// Live entry lifetime
    #[inline]
    #[must_use]
    pub fn live_ttl(&self) -> Duration {
        Duration::from_millis(self.live_ttl_ms)
    }

    /// Fallback entry lifetime
    #[inline]
    #[must_use]
    pub fn fallback_ttl(&self) -> Duration {
        Duration::from_millis(self.fallback_ttl_ms)
    }

    /// Base retry delay
    #[inline]
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// With retry count
    #[inline]
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 256,
            live_ttl_ms: 30_000,
            fallback_ttl_ms: 5_000,
            retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

/// Dashboard client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Live API base URL
    pub api_base_url: String,
    /// Host serving the static snapshots
    pub asset_host: String,
    /// Deployment base path of the dashboard (e.g. `/ecoplanta/`)
    pub base_path: String,
    /// Bound on each live call
    pub timeout_ms: u64,
    /// Caching/query layer settings
    pub cache: CacheConfig,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `ECOPLANTA_*` environment variables
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each env var
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` if a value is unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(env::API_URL) {
            config.api_base_url = url;
        }
        if let Some(host) = lookup(env::ASSET_HOST) {
            config.asset_host = host;
        }
        if let Some(path) = lookup(env::BASE_PATH) {
            config.base_path = path;
        }
        if let Some(raw) = lookup(env::TIMEOUT_MS) {
            config.timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: env::TIMEOUT_MS,
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// `ConfigError::Toml` on malformed input.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// With live API base URL
    #[inline]
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// With static asset host
    #[inline]
    #[must_use]
    pub fn with_asset_host(mut self, host: impl Into<String>) -> Self {
        self.asset_host = host.into();
        self
    }

    /// With deployment base path
    #[inline]
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = path.into();
        self
    }

    /// With live call bound
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With caching layer settings
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Live call bound
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Live API base without trailing slash
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// URL prefix of the snapshot directory, always ending in `/`
    ///
    /// `asset_host` + base path (normalised to `/…/`) + `api/`.
    #[must_use]
    pub fn static_base(&self) -> String {
        let host = self.asset_host.trim_end_matches('/');
        let trimmed = self.base_path.trim_matches('/');
        if trimmed.is_empty() {
            format!("{host}/{SNAPSHOT_DIR}")
        } else {
            format!("{host}/{trimmed}/{SNAPSHOT_DIR}")
        }
    }

    /// Check URLs and timeout
    ///
    /// # Errors
    /// - `ConfigError::InvalidUrl` for a non-http(s) or unparsable URL
    /// - `ConfigError::ZeroTimeout` for a zero bound
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url("api_base_url", &self.api_base_url)?;
        check_http_url("asset_host", &self.asset_host)?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            asset_host: DEFAULT_ASSET_HOST.to_string(),
            base_path: "/".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cache: CacheConfig::default(),
        }
    }
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let url = reqwest::Url::parse(value).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        _ => Err(invalid()),
    }
}
