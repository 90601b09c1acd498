//! Shared setup for the client integration tests

#![allow(dead_code)]

use ecoplanta_client::{dashboard_endpoints, ClientConfig, ConnectivityState, DashboardApi, ResilientClient};
use std::sync::Arc;
use std::time::Duration;

/// Bound used for every live call in these tests
pub const TEST_TIMEOUT: Duration = Duration::from_millis(300);

/// Slack allowed on top of the bound when measuring timeouts
pub const TIMEOUT_TOLERANCE: Duration = Duration::from_millis(500);

/// Plain reqwest client that never routes localhost through a proxy
pub fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn config(api: &str, assets: &str) -> ClientConfig {
    ClientConfig::new()
        .with_api_base_url(api)
        .with_asset_host(assets)
        .with_timeout(TEST_TIMEOUT)
}

pub fn client(api: &str, assets: &str) -> ResilientClient {
    ResilientClient::builder(config(api, assets), dashboard_endpoints().unwrap())
        .http_client(http())
        .build()
        .unwrap()
}

/// Client sharing a connectivity holder the test can inspect
pub fn client_with_state(api: &str, assets: &str) -> (ResilientClient, Arc<ConnectivityState>) {
    let state = Arc::new(ConnectivityState::new());
    let client = ResilientClient::builder(config(api, assets), dashboard_endpoints().unwrap())
        .http_client(http())
        .connectivity(Arc::clone(&state))
        .build()
        .unwrap();
    (client, state)
}

pub fn dashboard(api: &str, assets: &str) -> DashboardApi {
    DashboardApi::new(client(api, assets))
}
