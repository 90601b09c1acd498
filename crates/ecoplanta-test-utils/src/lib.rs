//! Testing utilities for the EcoPlanta dashboard client
//!
//! - [`StubServer`]: warp-based stand-in for the live API or the static host
//! - [`SilentServer`]: accepts connections and never answers (timeouts)
//! - [`unreachable_url`]: a local URL nothing listens on
//! - [`fixtures`]: snapshot bodies shaped like the generator's output

#![allow(missing_docs)]

pub mod fixtures;

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::http::{header, Method, Response};
use warp::hyper::body::Bytes;
use warp::Filter;

/// One canned response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub delay: Duration,
}

impl StubResponse {
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "application/json",
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: &serde_json::Value) -> Self {
        Self::json(200, body)
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: "text/plain",
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request the stub received
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Option<serde_json::Value>,
}

type RouteKey = (String, String);

#[derive(Debug, Default)]
struct StubState {
    routes: Mutex<HashMap<RouteKey, StubResponse>>,
    hits: Mutex<Vec<Hit>>,
}

impl StubState {
    async fn respond(&self, method: Method, path: &str, query: String, body: Bytes) -> Response<String> {
        let hit = Hit {
            method: method.to_string(),
            path: path.to_string(),
            query,
            body: serde_json::from_slice(&body).ok(),
        };
        self.hits.lock().unwrap().push(hit);

        let canned = self
            .routes
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_else(|| StubResponse::text(404, "not found"));

        if !canned.delay.is_zero() {
            tokio::time::sleep(canned.delay).await;
        }

        Response::builder()
            .status(canned.status)
            .header(header::CONTENT_TYPE, canned.content_type)
            .body(canned.body)
            .unwrap()
    }
}

/// Builder for [`StubServer`]
#[derive(Debug, Default)]
pub struct StubServerBuilder {
    routes: HashMap<RouteKey, StubResponse>,
}

impl StubServerBuilder {
    #[must_use]
    pub fn route(mut self, method: &str, path: &str, response: StubResponse) -> Self {
        self.routes
            .insert((method.to_ascii_uppercase(), path.to_string()), response);
        self
    }

    #[must_use]
    pub fn get(self, path: &str, response: StubResponse) -> Self {
        self.route("GET", path, response)
    }

    #[must_use]
    pub fn get_json(self, path: &str, body: &serde_json::Value) -> Self {
        self.get(path, StubResponse::ok(body))
    }

    /// Serve a snapshot at `/api/<id>`, as a static host at base path `/`
    #[must_use]
    pub fn snapshot(self, id: &str, body: &serde_json::Value) -> Self {
        self.get_json(&format!("/api/{id}"), body)
    }

    /// Serve every fixture snapshot
    #[must_use]
    pub fn all_snapshots(self) -> Self {
        fixtures::all()
            .into_iter()
            .fold(self, |builder, (id, body)| builder.snapshot(id, &body))
    }

    /// Bind to an ephemeral localhost port and start serving
    pub async fn start(self) -> StubServer {
        let state = Arc::new(StubState {
            routes: Mutex::new(self.routes),
            hits: Mutex::default(),
        });

        let handler_state = Arc::clone(&state);
        let filter = warp::method()
            .and(warp::path::full())
            .and(warp::query::raw().or(warp::any().map(String::new)).unify())
            .and(warp::body::bytes())
            .and_then(move |method: Method, path: warp::path::FullPath, query: String, body: Bytes| {
                let state = Arc::clone(&handler_state);
                async move { Ok::<_, Infallible>(state.respond(method, path.as_str(), query, body).await) }
            });

        let (shutdown, signal) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(filter).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
            let _ = signal.await;
        });
        tokio::spawn(server);

        StubServer {
            addr,
            state,
            shutdown: Some(shutdown),
        }
    }
}

/// Running stub HTTP server; shut down on drop
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubServer {
    pub fn builder() -> StubServerBuilder {
        StubServerBuilder::default()
    }

    /// `http://127.0.0.1:<port>`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Replace or add a route while running
    pub fn set(&self, method: &str, path: &str, response: StubResponse) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_ascii_uppercase(), path.to_string()), response);
    }

    /// Remove a route; it answers 404 afterwards
    pub fn remove(&self, method: &str, path: &str) {
        self.state
            .routes
            .lock()
            .unwrap()
            .remove(&(method.to_ascii_uppercase(), path.to_string()));
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }

    /// Requests received for `path`, any method
    pub fn hit_count(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|hit| hit.path == path)
            .count()
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().len()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Server that accepts connections but never writes a byte
#[derive(Debug)]
pub struct SilentServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl SilentServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        Self { addr, task }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for SilentServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// URL of a localhost port with no listener
///
/// Binds an ephemeral port and releases it; connections are refused.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
