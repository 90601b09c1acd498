//! Query cache over the resilient client using moka
//!
//! The caller-side layer the core leaves room for:
//! - concurrent queries for the same (path, payload type) share one core call
//! - entries expire per source: live data lives for `live_ttl`, snapshot data
//!   for the shorter `fallback_ttl` so a recovered backend is picked up soon
//! - retryable failures are retried here with linear backoff
//! - errors are never cached
//! - successful mutations invalidate entries under the given path prefixes

use crate::client::{ApiRequest, DataSource, Fetched, ResilientClient};
use crate::config::CacheConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::endpoint::path_only;
use crate::error::FetchError;
use moka::future::Cache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache key: request path plus payload type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: String,
    type_id: TypeId,
}

impl CacheKey {
    /// Create key for payload type `T`
    #[inline]
    #[must_use]
    pub fn new<T: 'static>(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Request path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    source: DataSource,
    value: Arc<dyn Any + Send + Sync>,
}

struct SourceExpiry {
    live: Duration,
    fallback: Duration,
}

impl SourceExpiry {
    fn ttl(&self, entry: &CacheEntry) -> Duration {
        match entry.source {
            DataSource::Live => self.live,
            DataSource::Fallback => self.fallback,
        }
    }
}

impl Expiry<CacheKey, CacheEntry> for SourceExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.ttl(value))
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(self.ttl(value))
    }
}

/// Whether `prefix` covers `path` on a segment boundary
fn covers(prefix: &str, path: &str) -> bool {
    let path = path_only(path);
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Delay before retry number `attempt`, saturating instead of overflowing
fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Caching query client
#[derive(Clone)]
pub struct QueryClient {
    client: ResilientClient,
    cache: Cache<CacheKey, CacheEntry>,
    config: CacheConfig,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("config", &self.config)
            .field("entry_count", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    /// Create query client
    #[must_use]
    pub fn new(client: ResilientClient, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(SourceExpiry {
                live: config.live_ttl(),
                fallback: config.fallback_ttl(),
            })
            .support_invalidation_closures()
            .build();
        Self {
            client,
            cache,
            config,
        }
    }

    /// Underlying client
    #[inline]
    #[must_use]
    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    /// Connectivity reader
    #[must_use]
    pub fn connectivity(&self) -> ConnectivityMonitor {
        self.client.connectivity()
    }

    /// Cached `GET` of `path` decoded as `T`
    ///
    /// # Errors
    /// The last `FetchError` once retries are exhausted or on a
    /// non-retryable failure.
    pub async fn query<T>(&self, path: &str) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.query_with_source(path).await.map(|fetched| fetched.value)
    }

    /// Cached `GET` of `path`, reporting whether it came from a snapshot
    ///
    /// # Errors
    /// The last `FetchError` once retries are exhausted or on a
    /// non-retryable failure.
    pub async fn query_with_source<T>(&self, path: &str) -> Result<Fetched<T>, FetchError>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let key = CacheKey::new::<T>(path);
        let request = ApiRequest::get(path);

        let entry = self
            .cache
            .try_get_with(key.clone(), async {
                let fetched = self.load_with_retry::<T>(&request).await?;
                Ok::<_, FetchError>(CacheEntry {
                    source: fetched.source,
                    value: Arc::new(fetched.value),
                })
            })
            .await
            .map_err(|err| Arc::try_unwrap(err).unwrap_or_else(|shared| (*shared).clone()))?;

        match entry.value.downcast_ref::<T>() {
            Some(value) => Ok(Fetched {
                value: value.clone(),
                source: entry.source,
            }),
            None => {
                // Unreachable while keys carry the TypeId
                tracing::warn!("Cache entry for {} has unexpected type, refetching", path);
                self.cache.invalidate(&key).await;
                self.load_with_retry(&request).await
            }
        }
    }

    /// Send a mutation through the core, then invalidate covered entries
    ///
    /// Never cached and never retried. Invalidation happens only on success.
    ///
    /// # Errors
    /// The live call's `FetchError`.
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        invalidate_prefixes: &[&str],
    ) -> Result<T, FetchError> {
        let value = self.client.fetch(request).await?;
        for prefix in invalidate_prefixes {
            self.invalidate(prefix);
        }
        Ok(value)
    }

    /// Invalidate every entry whose path is `prefix` or lies below it
    pub fn invalidate(&self, prefix: &str) {
        let owned = prefix.to_string();
        let predicate = move |key: &CacheKey, _: &CacheEntry| covers(&owned, &key.path);
        match self.cache.invalidate_entries_if(predicate) {
            Ok(_) => tracing::debug!("Invalidated cached queries under {}", prefix),
            Err(err) => {
                tracing::warn!("Prefix invalidation of {} failed ({}), clearing cache", prefix, err);
                self.cache.invalidate_all();
            }
        }
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate entry count (accurate after [`Self::run_pending_tasks`])
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flush moka's pending maintenance work
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Cache settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn load_with_retry<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Fetched<T>, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            match self.client.fetch_with_source::<T>(request).await {
                Ok(fetched) => return Ok(fetched),
                Err(err) if err.is_retryable() && attempt < self.config.retries => {
                    attempt += 1;
                    let delay = linear_backoff(self.config.retry_backoff(), attempt);
                    tracing::debug!(
                        "Retrying {} in {}ms (attempt {}/{}): {}",
                        request.path(),
                        delay.as_millis(),
                        attempt,
                        self.config.retries,
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
