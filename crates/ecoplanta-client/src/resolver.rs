//! Transport resolver
//!
//! Maps a logical request path to the live URL to call and the static
//! fallback resource, if one is configured. Resolution always succeeds; a
//! path with no registered query simply has no fallback.

use crate::config::ClientConfig;
use crate::endpoint::{EndpointTable, FallbackId};
use std::sync::Arc;

/// Where one logical request goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Absolute URL on the live API
    pub live_url: String,
    /// Snapshot that may replace the live response
    pub fallback: Option<FallbackId>,
}

/// Resolves logical paths against the endpoint table
#[derive(Debug, Clone)]
pub struct TransportResolver {
    api_base: String,
    table: Arc<EndpointTable>,
}

impl TransportResolver {
    /// Create resolver for a live API base URL
    pub fn new(api_base: impl Into<String>, table: Arc<EndpointTable>) -> Self {
        let mut api_base = api_base.into();
        while api_base.ends_with('/') {
            api_base.pop();
        }
        Self { api_base, table }
    }

    /// Create resolver from client configuration
    #[must_use]
    pub fn from_config(config: &ClientConfig, table: Arc<EndpointTable>) -> Self {
        Self::new(config.api_base(), table)
    }

    /// Resolve a logical path (query string allowed)
    ///
    /// Pure: the same path always yields the same resolution.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Resolution {
        if !self.table.is_registered(path) {
            tracing::warn!("Resolving unregistered endpoint path: {}", path);
        }

        let live_url = if path.starts_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        };

        Resolution {
            live_url,
            fallback: self.table.fallback_for(path).cloned(),
        }
    }

    /// Live API base
    #[inline]
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Endpoint table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &EndpointTable {
        &self.table
    }
}
