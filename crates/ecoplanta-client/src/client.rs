//! Resilient client: orchestration of resolve → execute → maybe-fallback
//!
//! Per-call state machine:
//!
//! ```text
//! Start → Attempting ─┬→ Succeeded
//!                     └→ Failed ─┬→ (raise: mutation or no fallback)
//!                                └→ FallbackAttempted ─┬→ FallbackSucceeded
//!                                                      └→ FallbackFailed (raise)
//! ```
//!
//! There are no retries inside one logical fetch; retry policy belongs to
//! the caller (see [`crate::cache::QueryClient`]).

use crate::config::ClientConfig;
use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::endpoint::{Access, EndpointTable};
use crate::error::{ConfigError, FetchError};
use crate::executor::{default_http_client, BoundedExecutor};
use crate::fallback::{FallbackMaterializer, FallbackSource, HttpFallbackSource};
use crate::resolver::TransportResolver;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a returned payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The live API
    Live,
    /// A static snapshot, because the live call failed
    Fallback,
}

/// Payload plus its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    /// Parsed payload
    pub value: T,
    /// Live or snapshot
    pub source: DataSource,
}

impl<T> Fetched<T> {
    /// Check if payload came from a snapshot
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// States of one logical fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    /// Request resolved, nothing sent yet
    Start,
    /// Live call in flight
    Attempting,
    /// Live call returned a usable body
    Succeeded,
    /// Live call failed
    Failed,
    /// Snapshot being loaded
    FallbackAttempted,
    /// Snapshot served in place of the live body
    FallbackSucceeded,
    /// Snapshot unavailable; the live error is returned
    FallbackFailed,
}

impl FetchState {
    /// States reachable in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [FetchState] {
        match self {
            Self::Start => &[Self::Attempting],
            Self::Attempting => &[Self::Succeeded, Self::Failed],
            Self::Failed => &[Self::FallbackAttempted],
            Self::FallbackAttempted => &[Self::FallbackSucceeded, Self::FallbackFailed],
            Self::Succeeded | Self::FallbackSucceeded | Self::FallbackFailed => &[],
        }
    }

    /// Check if `next` is reachable in one step
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, next: FetchState) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// No further transitions possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks and logs the state of one fetch
struct FetchTrace<'a> {
    path: &'a str,
    state: FetchState,
}

impl<'a> FetchTrace<'a> {
    fn start(path: &'a str) -> Self {
        Self {
            path,
            state: FetchState::Start,
        }
    }

    fn advance(&mut self, next: FetchState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal fetch transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Fetch {}: {} -> {}", self.path, self.state, next);
        self.state = next;
    }
}

/// One logical request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    path: String,
    method: Method,
    access: Access,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    /// `GET` query
    pub fn get(path: impl Into<String>) -> Self {
        Self::query(Method::GET, path)
    }

    /// Read-only request with an explicit method (e.g. a safe `PUT`)
    pub fn query(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            access: Access::Query,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Mutating request; never served from a snapshot
    pub fn mutation(method: Method, path: impl Into<String>) -> Self {
        Self {
            access: Access::Mutation,
            ..Self::query(method, path)
        }
    }

    /// `POST` mutation with a JSON body
    ///
    /// # Errors
    /// `FetchError::Encode` if the body cannot be serialized.
    pub fn post(path: impl Into<String>, body: &impl Serialize) -> Result<Self, FetchError> {
        Self::mutation(Method::POST, path).with_json(body)
    }

    /// `PATCH` mutation with a JSON body
    ///
    /// # Errors
    /// `FetchError::Encode` if the body cannot be serialized.
    pub fn patch(path: impl Into<String>, body: &impl Serialize) -> Result<Self, FetchError> {
        Self::mutation(Method::PATCH, path).with_json(body)
    }

    /// With JSON body
    ///
    /// # Errors
    /// `FetchError::Encode` if the body cannot be serialized.
    pub fn with_json(mut self, body: &impl Serialize) -> Result<Self, FetchError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| FetchError::encode(&e))?);
        Ok(self)
    }

    /// With extra header
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Logical path (may include a query string)
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method
    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Access mode
    #[inline]
    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    /// JSON body
    #[inline]
    #[must_use]
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Extra headers
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[derive(Debug)]
struct Inner {
    resolver: TransportResolver,
    executor: BoundedExecutor,
    materializer: FallbackMaterializer,
    monitor: ConnectivityMonitor,
}

/// Resilient data-fetching client
///
/// Cheap to clone; clones share the executor, the endpoint table and the
/// connectivity signal.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    inner: Arc<Inner>,
}

impl ResilientClient {
    /// Create client with an HTTP snapshot source at the configured static base
    ///
    /// # Errors
    /// `ConfigError` if the configuration is invalid.
    pub fn new(config: &ClientConfig, table: EndpointTable) -> Result<Self, ConfigError> {
        Self::builder(config.clone(), table).build()
    }

    /// Builder for injecting connectivity state, snapshot source or HTTP client
    #[must_use]
    pub fn builder(config: ClientConfig, table: EndpointTable) -> ResilientClientBuilder {
        ResilientClientBuilder {
            config,
            table,
            http: None,
            connectivity: None,
            fallback_source: None,
        }
    }

    /// Connectivity reader for status indicators
    #[must_use]
    pub fn connectivity(&self) -> ConnectivityMonitor {
        self.inner.monitor.clone()
    }

    /// Transport resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &TransportResolver {
        &self.inner.resolver
    }

    /// Fetch and decode a payload
    ///
    /// # Errors
    /// The live call's `FetchError` when it failed and no snapshot could
    /// replace it.
    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, FetchError> {
        self.fetch_with_source(request).await.map(|fetched| fetched.value)
    }

    /// Fetch and decode a payload, reporting whether it came from a snapshot
    ///
    /// # Errors
    /// The live call's `FetchError` when it failed and no snapshot could
    /// replace it.
    pub async fn fetch_with_source<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Fetched<T>, FetchError> {
        let mut trace = FetchTrace::start(request.path());

        // 1. Resolve
        let resolution = self.inner.resolver.resolve(request.path());

        // 2. Execute
        trace.advance(FetchState::Attempting);
        let outcome = self
            .inner
            .executor
            .execute::<T>(
                &resolution.live_url,
                request.method().clone(),
                request.body(),
                request.headers(),
            )
            .await;

        // 3. Success
        let kind = outcome.kind();
        let error = match outcome.into_result(&resolution.live_url) {
            Ok(value) => {
                trace.advance(FetchState::Succeeded);
                return Ok(Fetched {
                    value,
                    source: DataSource::Live,
                });
            }
            Err(error) => {
                trace.advance(FetchState::Failed);
                error
            }
        };

        // 4. Fallback for queries with a snapshot
        let fallback = match (request.access(), resolution.fallback) {
            (Access::Query, Some(id)) => id,
            (Access::Mutation, _) => {
                tracing::warn!(
                    "Mutation {} {} failed ({}): {}",
                    request.method(),
                    request.path(),
                    kind,
                    error
                );
                return Err(error);
            }
            (Access::Query, None) => {
                tracing::warn!(
                    "Query {} failed ({}), no fallback: {}",
                    request.path(),
                    kind,
                    error
                );
                return Err(error);
            }
        };

        trace.advance(FetchState::FallbackAttempted);
        if let Some(value) = self.inner.materializer.materialize::<T>(&fallback).await {
            trace.advance(FetchState::FallbackSucceeded);
            tracing::warn!(
                "Query {} failed ({}), served fallback {}",
                request.path(),
                kind,
                fallback
            );
            return Ok(Fetched {
                value,
                source: DataSource::Fallback,
            });
        }

        trace.advance(FetchState::FallbackFailed);
        tracing::warn!(
            "Query {} failed ({}), fallback {} unavailable: {}",
            request.path(),
            kind,
            fallback,
            error
        );
        Err(error)
    }
}

/// Builder for [`ResilientClient`]
#[derive(Debug)]
pub struct ResilientClientBuilder {
    config: ClientConfig,
    table: EndpointTable,
    http: Option<reqwest::Client>,
    connectivity: Option<Arc<ConnectivityState>>,
    fallback_source: Option<Arc<dyn FallbackSource>>,
}

impl ResilientClientBuilder {
    /// Use a preconfigured HTTP client for live and snapshot calls
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Share an existing connectivity holder
    #[must_use]
    pub fn connectivity(mut self, state: Arc<ConnectivityState>) -> Self {
        self.connectivity = Some(state);
        self
    }

    /// Serve snapshots from a custom source
    #[must_use]
    pub fn fallback_source(mut self, source: Arc<dyn FallbackSource>) -> Self {
        self.fallback_source = Some(source);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// - `ConfigError` from [`ClientConfig::validate`]
    /// - `ConfigError::HttpClient` if the default HTTP client cannot be built
    pub fn build(self) -> Result<ResilientClient, ConfigError> {
        self.config.validate()?;

        let http = match self.http {
            Some(http) => http,
            None => default_http_client().map_err(|e| ConfigError::HttpClient(e.to_string()))?,
        };
        let connectivity = self.connectivity.unwrap_or_default();
        let source: Arc<dyn FallbackSource> = match self.fallback_source {
            Some(source) => source,
            None => Arc::new(HttpFallbackSource::new(http.clone(), self.config.static_base())),
        };

        tracing::debug!(
            "Dashboard client: api={} snapshots={} timeout={}ms endpoints={}",
            self.config.api_base(),
            self.config.static_base(),
            self.config.timeout_ms,
            self.table.len()
        );

        let monitor = connectivity.monitor();
        Ok(ResilientClient {
            inner: Arc::new(Inner {
                resolver: TransportResolver::from_config(&self.config, Arc::new(self.table)),
                executor: BoundedExecutor::new(http, self.config.timeout(), connectivity),
                materializer: FallbackMaterializer::new(source),
                monitor,
            }),
        })
    }
}
