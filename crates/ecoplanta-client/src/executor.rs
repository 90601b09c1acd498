//! Bounded request executor
//!
//! Performs exactly one live HTTP attempt per call under a hard timeout,
//! classifies the result into a [`RequestOutcome`], and records the implied
//! connectivity. The connectivity write happens for every attempt, before the
//! caller decides anything about fallbacks. Any 2xx counts as `Online`,
//! including one whose body then fails to decode.
//!
//! Classification, in priority order:
//! - no response within the bound → `Timeout`
//! - transport failure → `NetworkError`
//! - non-2xx → `HttpError` with the body as diagnostic text
//! - 2xx that fails to decode → `InvalidBody`
//! - 2xx → `Success`

use crate::connectivity::ConnectivityState;
use crate::outcome::RequestOutcome;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Bound applied to live calls unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Executes live calls and owns the connectivity writer
#[derive(Debug, Clone)]
pub struct BoundedExecutor {
    http: reqwest::Client,
    timeout: Duration,
    connectivity: Arc<ConnectivityState>,
}

impl BoundedExecutor {
    /// Create executor
    #[must_use]
    pub fn new(http: reqwest::Client, timeout: Duration, connectivity: Arc<ConnectivityState>) -> Self {
        Self {
            http,
            timeout,
            connectivity,
        }
    }

    /// Configured bound
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connectivity writer
    #[inline]
    #[must_use]
    pub fn connectivity(&self) -> &ConnectivityState {
        &self.connectivity
    }

    /// One bounded live attempt
    ///
    /// # Arguments
    /// * `url` - Absolute live URL
    /// * `method` - HTTP method
    /// * `body` - JSON body, sent with `Content-Type: application/json`
    /// * `headers` - Extra request headers
    pub async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        body: Option<&serde_json::Value>,
        headers: &HeaderMap,
    ) -> RequestOutcome<T> {
        let outcome = self.attempt(url, method, body, headers).await;
        self.connectivity.record(outcome.connectivity());
        tracing::debug!("Live call {} -> {}", url, outcome.kind());
        outcome
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        body: Option<&serde_json::Value>,
        headers: &HeaderMap,
    ) -> RequestOutcome<T> {
        let mut request = self.http.request(method, url).headers(headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let call = async move {
            let response = request.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes))
        };

        // Dropping `call` on expiry cancels the in-flight request
        let (status, bytes) = match tokio::time::timeout(self.timeout, call).await {
            Err(_) => {
                return RequestOutcome::Timeout {
                    after: started.elapsed(),
                }
            }
            Ok(Err(err)) if err.is_timeout() => {
                return RequestOutcome::Timeout {
                    after: started.elapsed(),
                }
            }
            Ok(Err(err)) => {
                return RequestOutcome::NetworkError {
                    message: describe_transport_error(&err),
                }
            }
            Ok(Ok(response)) => response,
        };

        if !status.is_success() {
            return RequestOutcome::HttpError {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            };
        }

        match serde_json::from_slice::<T>(&bytes) {
            Ok(body) => RequestOutcome::Success {
                status: status.as_u16(),
                body,
            },
            Err(err) => RequestOutcome::InvalidBody {
                status: status.as_u16(),
                message: err.to_string(),
            },
        }
    }
}

/// Flatten a reqwest error and its sources into one line
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Default HTTP client for live and fallback calls
///
/// # Errors
/// `reqwest::Error` if the TLS backend cannot be initialised.
pub fn default_http_client() -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(concat!("ecoplanta-client/", env!("CARGO_PKG_VERSION")))
        .build()
}
