//! Error types for the dashboard client
//!
//! Provides error handling for:
//! - Live fetches (timeout, transport, HTTP status, body decoding)
//! - Client and endpoint-table configuration
//! - Logging setup

#![allow(missing_docs)]

use crate::endpoint::Access;
use std::time::Duration;

/// Error surfaced to callers of a fetch
///
/// This is always the error of the *live* call. When a fallback snapshot was
/// attempted and also failed, the fallback failure is logged and dropped so
/// the caller sees one coherent reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Live call exceeded the request bound
    #[error("request to {url} timed out after {}ms", .after.as_millis())]
    Timeout { url: String, after: Duration },

    /// Transport-level failure (DNS, refused connection, reset)
    #[error("network error reaching {url}: {message}")]
    Network { url: String, message: String },

    /// Live API answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Live API answered 2xx with a body that does not match the payload type
    #[error("invalid response body from {url} (HTTP {status}): {message}")]
    Decode {
        url: String,
        status: u16,
        message: String,
    },

    /// Request body could not be serialized
    #[error("request body could not be encoded: {0}")]
    Encode(String),
}

impl FetchError {
    /// HTTP status of the failure, `0` for network-level failures
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Http { status, .. } | Self::Decode { status, .. } => *status,
            Self::Timeout { .. } | Self::Network { .. } | Self::Encode(_) => 0,
        }
    }

    /// Diagnostic message (response body text for HTTP errors)
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Http { body, .. } => body.clone(),
            Self::Network { message, .. } | Self::Decode { message, .. } => message.clone(),
            Self::Encode(message) => message.clone(),
            Self::Timeout { .. } => self.to_string(),
        }
    }

    /// Check if error is a timeout
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Timeouts and transport failures; the live API was never heard from
    #[inline]
    #[must_use]
    pub fn is_network_level(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }

    /// Check if a retry by the caller may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Decode { .. } | Self::Encode(_) => false,
        }
    }

    /// Create encode error from a serde failure
    pub(crate) fn encode(err: &serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

/// Configuration errors (client settings and endpoint tables)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A mutating endpoint was given a static fallback
    #[error("mutation {path} cannot have a fallback (got '{fallback}')")]
    FallbackOnMutation { path: String, fallback: String },

    /// Same access and path registered twice
    #[error("endpoint registered twice: {access} {path}")]
    DuplicateEndpoint { access: Access, path: String },

    /// Endpoint path is empty, relative, or carries a query string
    #[error("invalid endpoint path '{0}': must start with '/' and have no query string")]
    InvalidPath(String),

    /// Fallback id would escape the static asset directory
    #[error("invalid fallback id '{0}': must be a plain file name")]
    InvalidFallbackId(String),

    /// URL setting does not parse as an absolute http(s) URL
    #[error("invalid url for {field}: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    /// Request bound of zero
    #[error("timeout must be non-zero")]
    ZeroTimeout,

    /// Environment variable present but unparsable
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    /// Config file could not be parsed
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP client could not be constructed
    #[error("http client construction failed: {0}")]
    HttpClient(String),
}

/// Logging could not be installed (usually: a subscriber is already set)
#[derive(Debug, thiserror::Error)]
#[error("tracing subscriber not installed: {0}")]
pub struct TelemetryError(pub String);

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
