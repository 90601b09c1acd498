//! Fallback materializer and snapshot sources
//!
//! When a live query fails, the materializer fetches the configured static
//! snapshot and decodes it as the same payload type the live endpoint would
//! have produced. It is best-effort: any failure yields `None` and the caller
//! re-raises the original live error.
//!
//! Snapshots normally come over HTTP from the static asset host
//! ([`HttpFallbackSource`]); [`DirFallbackSource`] reads them from a local
//! directory instead.

#![allow(missing_docs)]

use crate::endpoint::FallbackId;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Why a snapshot could not be used
///
/// Never returned to fetch callers; always collapsed into the live error.
#[derive(Debug, thiserror::Error)]
pub enum FallbackUnavailable {
    /// Snapshot host unreachable
    #[error("snapshot {id} unreachable: {message}")]
    Unreachable { id: FallbackId, message: String },

    /// Snapshot host answered with a failure status
    #[error("snapshot {id} returned HTTP {status}")]
    Status { id: FallbackId, status: u16 },

    /// Snapshot missing from a local directory
    #[error("snapshot {id} could not be read: {source}")]
    Io {
        id: FallbackId,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot does not decode as the requested payload type
    #[error("snapshot {id} is malformed: {message}")]
    Malformed { id: FallbackId, message: String },
}

/// Source of raw snapshot bytes
///
/// Implement this trait to serve snapshots from somewhere other than the
/// static asset host.
#[async_trait]
pub trait FallbackSource: Send + Sync + Debug + 'static {
    /// Load the raw bytes of one snapshot
    async fn load(&self, id: &FallbackId) -> Result<Vec<u8>, FallbackUnavailable>;
}

/// Snapshots served over plain HTTP GET from `<static base><id>`
#[derive(Debug, Clone)]
pub struct HttpFallbackSource {
    http: reqwest::Client,
    static_base: String,
}

impl HttpFallbackSource {
    /// Create source; `static_base` gets a trailing `/` if missing
    pub fn new(http: reqwest::Client, static_base: impl Into<String>) -> Self {
        let mut static_base = static_base.into();
        if !static_base.ends_with('/') {
            static_base.push('/');
        }
        Self { http, static_base }
    }

    /// URL a snapshot is fetched from
    #[must_use]
    pub fn url_for(&self, id: &FallbackId) -> String {
        format!("{}{}", self.static_base, id)
    }
}

#[async_trait]
impl FallbackSource for HttpFallbackSource {
    async fn load(&self, id: &FallbackId) -> Result<Vec<u8>, FallbackUnavailable> {
        let unreachable = |err: reqwest::Error| FallbackUnavailable::Unreachable {
            id: id.clone(),
            message: err.to_string(),
        };

        // No bound beyond the platform default; already degraded
        let response = self
            .http
            .get(self.url_for(id))
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallbackUnavailable::Status {
                id: id.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(unreachable)?;
        Ok(bytes.to_vec())
    }
}

/// Snapshots read from `<root>/<id>` on the local filesystem
#[derive(Debug, Clone)]
pub struct DirFallbackSource {
    root: PathBuf,
}

impl DirFallbackSource {
    /// Create source rooted at a directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FallbackSource for DirFallbackSource {
    async fn load(&self, id: &FallbackId) -> Result<Vec<u8>, FallbackUnavailable> {
        tokio::fs::read(self.root.join(id.as_str()))
            .await
            .map_err(|source| FallbackUnavailable::Io {
                id: id.clone(),
                source,
            })
    }
}

/// Retrieves and decodes snapshots
#[derive(Debug, Clone)]
pub struct FallbackMaterializer {
    source: Arc<dyn FallbackSource>,
}

impl FallbackMaterializer {
    /// Create materializer over a source
    #[must_use]
    pub fn new(source: Arc<dyn FallbackSource>) -> Self {
        Self { source }
    }

    /// Snapshot decoded as `T`, or `None` if unavailable
    pub async fn materialize<T: DeserializeOwned>(&self, id: &FallbackId) -> Option<T> {
        match self.try_materialize(id).await {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Fallback unavailable: {}", err);
                None
            }
        }
    }

    /// Snapshot decoded as `T`
    ///
    /// # Errors
    /// `FallbackUnavailable` if the snapshot cannot be loaded or decoded.
    pub async fn try_materialize<T: DeserializeOwned>(
        &self,
        id: &FallbackId,
    ) -> Result<T, FallbackUnavailable> {
        let bytes = self.source.load(id).await?;
        serde_json::from_slice(&bytes).map_err(|err| FallbackUnavailable::Malformed {
            id: id.clone(),
            message: err.to_string(),
        })
    }
}
