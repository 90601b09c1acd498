//! EcoPlanta dashboard client
//!
//! Resilient data access for the dashboard:
//! - Calls the live API under a hard timeout
//! - Falls back to static JSON snapshots for read-only queries
//! - Never serves a mutation from a snapshot
//! - Publishes a live-backend connectivity signal for status indicators
//! - Caches and retries queries in a layer above the core
//!
//! # Architecture
//!
//! | Module | Role |
//! |--------|------|
//! | [`endpoint`] | Endpoint descriptors and the immutable table |
//! | [`resolver`] | Logical path → live URL + snapshot id |
//! | [`executor`] | One bounded live attempt, classified |
//! | [`fallback`] | Snapshot sources and decoding |
//! | [`client`] | Orchestration of one logical fetch |
//! | [`api`] | Typed methods per dashboard route |
//! | [`cache`] | Query cache, retries, invalidation |
//!
//! # Example
//!
//! ```rust,ignore
//! use ecoplanta_client::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = DashboardApi::connect(&ClientConfig::from_env()?)?;
//!
//! let fabric = api.fabric().await?;
//! println!("{} production lines", fabric.production_lines.len());
//!
//! if api.connectivity().current() == Connectivity::Offline {
//!     println!("showing preview data");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod connectivity;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod fallback;
pub mod outcome;
pub mod resolver;
pub mod telemetry;

pub use api::{dashboard_endpoints, DashboardApi, DashboardOverview, MaterialFilter};
pub use cache::{CacheKey, QueryClient};
pub use client::{ApiRequest, DataSource, FetchState, Fetched, ResilientClient, ResilientClientBuilder};
pub use config::{CacheConfig, ClientConfig};
pub use connectivity::{Connectivity, ConnectivityMonitor, ConnectivityState};
pub use endpoint::{Access, Endpoint, EndpointTable, FallbackId};
pub use error::{ConfigError, FetchError, FetchResult, TelemetryError};
pub use executor::{BoundedExecutor, DEFAULT_TIMEOUT};
pub use fallback::{
    DirFallbackSource, FallbackMaterializer, FallbackSource, FallbackUnavailable,
    HttpFallbackSource,
};
pub use outcome::{OutcomeKind, RequestOutcome};
pub use resolver::{Resolution, TransportResolver};
pub use telemetry::{init_tracing, LogFormat};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the dashboard client
    pub use crate::{
        Access, ApiRequest, ClientConfig, Connectivity, ConnectivityMonitor, DashboardApi,
        DataSource, Endpoint, EndpointTable, FetchError, Fetched, QueryClient, ResilientClient,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
