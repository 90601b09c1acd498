//! End-to-end fallback behaviour of the resilient client.
//!
//! Guarantees exercised here:
//! - A failed live query with a configured snapshot returns the snapshot,
//!   unchanged, whatever the failure kind.
//! - A successful live query returns the live body, whatever the snapshot.
//! - Queries without a snapshot and all mutations surface the live error.
//! - When the snapshot is also unavailable, the caller sees the live error.
//! - Connectivity follows the live backend only.
//!
//! Every test drives the real reqwest stack against local warp stubs: one
//! stub plays the live API, another the static asset host.

mod common;

use common::{client, client_with_state, http, TEST_TIMEOUT, TIMEOUT_TOLERANCE};
use ecoplanta_client::api::paths;
use ecoplanta_client::{
    dashboard_endpoints, ApiRequest, Connectivity, DataSource, FetchError, ResilientClient,
};
use ecoplanta_payloads::FabricOverview;
use ecoplanta_test_utils::{fixtures, unreachable_url, SilentServer, StubResponse, StubServer};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Instant;

/// Scenario: live `/health` answers in time.
///
/// The caller must receive exactly the live object and connectivity must
/// become online.
#[tokio::test]
async fn health_from_live_api() {
    let live = StubServer::builder()
        .get_json("/health", &json!({"status": "ok", "version": "1.2"}))
        .start()
        .await;
    let assets = StubServer::builder().all_snapshots().start().await;
    let (client, state) = client_with_state(&live.url(), &assets.url());

    let body: Value = client.fetch(&ApiRequest::get("/health")).await.unwrap();

    assert_eq!(body, json!({"status": "ok", "version": "1.2"}));
    assert_eq!(state.current(), Connectivity::Online);
    assert_eq!(assets.total_hits(), 0);
}

/// Scenario: live host unreachable, `/api/fabric` has a snapshot.
///
/// The snapshot body comes back unchanged and connectivity is offline.
#[tokio::test]
async fn fabric_from_snapshot_when_live_unreachable() {
    let assets = StubServer::builder()
        .snapshot(fixtures::FABRIC, &fixtures::fabric_empty())
        .start()
        .await;
    let (client, state) = client_with_state(&unreachable_url(), &assets.url());

    let body: Value = client.fetch(&ApiRequest::get("/api/fabric")).await.unwrap();
    assert_eq!(body, json!({"production_lines": [], "work_orders": [], "metrics": {}}));
    assert_eq!(state.current(), Connectivity::Offline);

    // Same snapshot through the typed payload
    let typed: FabricOverview = client.fetch(&ApiRequest::get("/api/fabric")).await.unwrap();
    assert_eq!(typed, FabricOverview::default());
    assert_eq!(assets.hit_count("/api/fabric.json"), 2);
}

/// Scenario: `POST /api/sales/leads` with the live host unreachable.
///
/// A network error reaches the caller and the static host is never asked,
/// even though `/api/sales` has a snapshot.
#[tokio::test]
async fn lead_creation_never_falls_back() {
    let assets = StubServer::builder().all_snapshots().start().await;
    let client = client(&unreachable_url(), &assets.url());

    let request = ApiRequest::post(
        "/api/sales/leads",
        &json!({"name": "Ana Sousa", "email": "ana@example.pt", "region": "Lisboa"}),
    )
    .unwrap();
    let err = client.fetch::<Value>(&request).await.unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "{err:?}");
    assert_eq!(err.status(), 0);
    assert_eq!(assets.total_hits(), 0);
}

/// Scenario: `/api/partners/optimize` (no snapshot) answers HTTP 500.
#[tokio::test]
async fn live_only_query_surfaces_http_error() {
    let live = StubServer::builder()
        .get("/api/partners/optimize", StubResponse::text(500, "internal error"))
        .start()
        .await;
    let assets = StubServer::builder().all_snapshots().start().await;
    let client = client(&live.url(), &assets.url());

    let err = client
        .fetch::<Value>(&ApiRequest::get("/api/partners/optimize"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetchError::Http {
            status: 500,
            body: "internal error".to_string()
        }
    );
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "internal error");
    assert_eq!(assets.total_hits(), 0);
}

/// Scenario: live `/api/deploy` never answers.
///
/// The call is cut at the bound, the snapshot is served and connectivity is
/// offline. The whole fetch stays within bound + tolerance.
#[tokio::test]
async fn deploy_from_snapshot_after_timeout() {
    let live = SilentServer::start().await;
    let assets = StubServer::builder()
        .snapshot(fixtures::DEPLOY, &fixtures::deploy())
        .start()
        .await;
    let (client, state) = client_with_state(&live.url(), &assets.url());

    let started = Instant::now();
    let fetched = client
        .fetch_with_source::<Value>(&ApiRequest::get("/api/deploy"))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(fetched.value, fixtures::deploy());
    assert_eq!(fetched.source, DataSource::Fallback);
    assert_eq!(state.current(), Connectivity::Offline);
    assert!(elapsed >= TEST_TIMEOUT, "returned before the bound: {elapsed:?}");
    assert!(elapsed < TEST_TIMEOUT + TIMEOUT_TOLERANCE, "too slow: {elapsed:?}");
}

/// A slow response (headers arrive after the bound) is a timeout too.
#[tokio::test]
async fn slow_live_response_times_out() {
    let live = StubServer::builder()
        .get(
            "/api/partners/optimize",
            StubResponse::ok(&json!({})).with_delay(TEST_TIMEOUT * 4),
        )
        .start()
        .await;
    let client = client(&live.url(), &unreachable_url());

    let started = Instant::now();
    let err = client
        .fetch::<Value>(&ApiRequest::get("/api/partners/optimize"))
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{err:?}");
    assert_eq!(err.status(), 0);
    assert!(started.elapsed() < TEST_TIMEOUT + TIMEOUT_TOLERANCE);
}

/// Every snapshot-backed query falls back when the live API is down.
#[tokio::test]
async fn every_snapshot_query_falls_back() {
    let assets = StubServer::builder().all_snapshots().start().await;
    let (client, state) = client_with_state(&unreachable_url(), &assets.url());

    let cases = [
        (paths::HEALTH, fixtures::health()),
        (paths::FABRIC, fixtures::fabric()),
        (paths::FABRIC_SCENE, fixtures::fabric_scene()),
        (paths::FRAMEWORKS, fixtures::frameworks()),
        (paths::SALES, fixtures::sales()),
        (paths::INTELLIGENCE, fixtures::intelligence()),
        (paths::DEPLOY, fixtures::deploy()),
        (paths::PARTNERS, fixtures::partners()),
    ];
    for (path, expected) in cases {
        let fetched = client
            .fetch_with_source::<Value>(&ApiRequest::get(path))
            .await
            .unwrap();
        assert_eq!(fetched.value, expected, "{path}");
        assert!(fetched.is_fallback(), "{path}");
    }
    assert_eq!(state.current(), Connectivity::Offline);
    assert_eq!(assets.total_hits(), 8);
}

/// Each failure classification leads to the same fallback.
///
/// Non-2xx answers mark connectivity offline; a 2xx that is not the expected
/// payload is served from the snapshot while connectivity stays online.
#[tokio::test]
async fn fallback_covers_every_failure_kind() {
    let assets = StubServer::builder().all_snapshots().start().await;
    let failing = [
        (StubResponse::text(500, "boom"), Connectivity::Offline),
        (StubResponse::text(503, "maintenance"), Connectivity::Offline),
        (StubResponse::text(404, "not found"), Connectivity::Offline),
        (StubResponse::text(401, "unauthorized"), Connectivity::Offline),
        // 2xx that is not a partner network
        (StubResponse::ok(&json!({"unexpected": true})), Connectivity::Online),
        (StubResponse::text(200, "<html>proxy login</html>"), Connectivity::Online),
    ];

    for (response, expected) in failing {
        let live = StubServer::builder()
            .get("/api/partners", response.clone())
            .start()
            .await;
        let (client, state) = client_with_state(&live.url(), &assets.url());

        let partners: ecoplanta_payloads::PartnerNetwork =
            client.fetch(&ApiRequest::get("/api/partners")).await.unwrap();

        assert_eq!(partners.partners[0].name, "EcoBuild Portugal", "{response:?}");
        assert_eq!(state.current(), expected, "{response:?}");
    }
}

/// Contract: the backend's own fabric summary is served from the snapshot
/// without reporting the backend as down.
#[tokio::test]
async fn backend_shape_mismatch_serves_snapshot_while_online() {
    let live = StubServer::builder()
        .get_json(
            "/api/fabric",
            &json!({
                "production_lines": [],
                "total_lines": 0,
                "lines_running": 0,
                "total_work_orders": 0
            }),
        )
        .start()
        .await;
    let assets = StubServer::builder().all_snapshots().start().await;
    let (client, state) = client_with_state(&live.url(), &assets.url());

    let fetched = client
        .fetch_with_source::<FabricOverview>(&ApiRequest::get("/api/fabric"))
        .await
        .unwrap();

    assert_eq!(fetched.source, DataSource::Fallback);
    assert_eq!(fetched.value.production_lines.len(), 2);
    assert_eq!(state.current(), Connectivity::Online);
    assert_eq!(live.hit_count("/api/fabric"), 1);
}

/// The live body wins even when the snapshot differs or is unavailable.
#[tokio::test]
async fn live_success_ignores_snapshot() {
    let live_body = json!({
        "partners": [],
        "metrics": {"total_partners": 0, "regions": 0, "compliant": 0, "avg_utilization": 0.0}
    });
    let live = StubServer::builder().get_json("/api/partners", &live_body).start().await;

    let assets = StubServer::builder().all_snapshots().start().await;

    for assets_url in [assets.url(), unreachable_url()] {
        let (client, state) = client_with_state(&live.url(), &assets_url);
        let fetched = client
            .fetch_with_source::<Value>(&ApiRequest::get("/api/partners"))
            .await
            .unwrap();
        assert_eq!(fetched.value, live_body);
        assert_eq!(fetched.source, DataSource::Live);
        assert_eq!(state.current(), Connectivity::Online);
    }
}

/// Queries without a snapshot propagate the live failure.
#[tokio::test]
async fn live_only_queries_propagate_errors() {
    let assets = StubServer::builder().all_snapshots().start().await;
    let client = client(&unreachable_url(), &assets.url());

    for path in ["/me", "/api/frameworks/fw-1", "/api/factory/inventory", "/api/patents/pt-1"] {
        let err = client.fetch::<Value>(&ApiRequest::get(path)).await.unwrap_err();
        assert!(err.is_network_level(), "{path}: {err:?}");
    }
    assert_eq!(assets.total_hits(), 0);
}

/// A mutation on a path whose query has a snapshot still never falls back.
#[tokio::test]
async fn mutation_on_snapshot_path_never_falls_back() {
    let live = StubServer::builder()
        .route("POST", "/api/fabric", StubResponse::text(502, "bad gateway"))
        .start()
        .await;
    let assets = StubServer::builder().all_snapshots().start().await;
    let client = client(&live.url(), &assets.url());

    let request = ApiRequest::mutation(Method::POST, "/api/fabric")
        .with_json(&json!({"line": "pl-1"}))
        .unwrap();
    let err = client.fetch::<Value>(&request).await.unwrap_err();

    assert_eq!(err.status(), 502);
    assert_eq!(assets.hit_count("/api/fabric.json"), 0);
}

/// Read-only access is a per-request flag, not inferred from the method.
#[tokio::test]
async fn non_get_query_may_fall_back() {
    let live = StubServer::builder()
        .route("PUT", "/api/fabric", StubResponse::text(500, "boom"))
        .start()
        .await;
    let assets = StubServer::builder().all_snapshots().start().await;
    let client = client(&live.url(), &assets.url());

    let fetched = client
        .fetch_with_source::<Value>(&ApiRequest::query(Method::PUT, "/api/fabric"))
        .await
        .unwrap();

    assert_eq!(fetched.value, fixtures::fabric());
    assert_eq!(fetched.source, DataSource::Fallback);
}

/// A missing snapshot collapses into the live error.
#[tokio::test]
async fn missing_snapshot_surfaces_live_error() {
    let live = StubServer::builder()
        .get("/api/sales", StubResponse::text(503, "maintenance"))
        .start()
        .await;
    // Static host without sales.json
    let assets = StubServer::builder()
        .snapshot(fixtures::HEALTH, &fixtures::health())
        .start()
        .await;
    let client = client(&live.url(), &assets.url());

    let err = client
        .fetch::<Value>(&ApiRequest::get("/api/sales"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetchError::Http {
            status: 503,
            body: "maintenance".to_string()
        }
    );
    assert_eq!(assets.hit_count("/api/sales.json"), 1);
}

/// A malformed snapshot collapses into the live error.
#[tokio::test]
async fn malformed_snapshot_surfaces_live_error() {
    let assets = StubServer::builder()
        .snapshot(fixtures::INTELLIGENCE, &json!({"insights": "not a list"}))
        .start()
        .await;
    let client = client(&unreachable_url(), &assets.url());

    let err = client
        .fetch::<ecoplanta_payloads::IntelligenceFeed>(&ApiRequest::get("/api/intelligence"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "{err:?}");
}

/// Both hosts down: the live error, not a snapshot error.
#[tokio::test]
async fn both_hosts_down_surfaces_live_error() {
    let client = client(&unreachable_url(), &unreachable_url());

    let err = client
        .fetch::<Value>(&ApiRequest::get("/api/frameworks"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "{err:?}");
}

/// Snapshots are found under the deployment base path.
#[tokio::test]
async fn snapshots_respect_base_path() {
    let assets = StubServer::builder()
        .get_json("/ecoplanta/api/health.json", &fixtures::health())
        .start()
        .await;
    let config = common::config(&unreachable_url(), &assets.url()).with_base_path("/ecoplanta/");
    let client = ResilientClient::builder(config, dashboard_endpoints().unwrap())
        .http_client(http())
        .build()
        .unwrap();

    let body: Value = client.fetch(&ApiRequest::get("/health")).await.unwrap();

    assert_eq!(body, fixtures::health());
    assert_eq!(assets.hit_count("/ecoplanta/api/health.json"), 1);
}

/// Connectivity tracks the live API across recovery.
#[tokio::test]
async fn connectivity_follows_live_recovery() {
    let live = StubServer::builder()
        .get("/health", StubResponse::text(500, "down"))
        .start()
        .await;
    let assets = StubServer::builder().all_snapshots().start().await;
    let (client, state) = client_with_state(&live.url(), &assets.url());
    let mut monitor = client.connectivity();
    assert_eq!(monitor.current(), Connectivity::Unknown);

    let first = client
        .fetch_with_source::<Value>(&ApiRequest::get("/health"))
        .await
        .unwrap();
    assert!(first.is_fallback());
    assert_eq!(monitor.changed().await, Some(Connectivity::Offline));

    live.set("GET", "/health", StubResponse::ok(&json!({"status": "ok", "version": "1.3"})));

    let second = client
        .fetch_with_source::<Value>(&ApiRequest::get("/health"))
        .await
        .unwrap();
    assert_eq!(second.source, DataSource::Live);
    assert_eq!(second.value["version"], "1.3");
    assert_eq!(monitor.changed().await, Some(Connectivity::Online));
    assert_eq!(state.current(), Connectivity::Online);
}

/// Concurrent fetches run independently against the same client.
#[tokio::test]
async fn concurrent_fetches_do_not_serialize() {
    let live = StubServer::builder()
        .get_json("/api/deploy", &fixtures::deploy())
        .get(
            "/api/partners/optimize",
            StubResponse::ok(&json!({"plan": []})).with_delay(TEST_TIMEOUT / 2),
        )
        .start()
        .await;
    let client = client(&live.url(), &unreachable_url());

    let started = Instant::now();
    let requests: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .fetch::<Value>(&ApiRequest::get("/api/partners/optimize"))
                    .await
            })
        })
        .collect();
    for handle in futures::future::join_all(requests).await {
        assert_eq!(handle.unwrap().unwrap(), json!({"plan": []}));
    }

    // Six delayed calls in parallel take about one delay, not six
    assert!(started.elapsed() < TEST_TIMEOUT * 2);
    assert_eq!(live.hit_count("/api/partners/optimize"), 6);
}
