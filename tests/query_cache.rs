//! End-to-end tests for the query cache against a mock REST backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use agentlens::client::ApiClient;
use agentlens::config::ApiConfig;
use agentlens::filters::{FilterPatch, FilterStore};
use agentlens::query::{Endpoint, QueryCache, QueryStatus};

#[derive(Default)]
struct Backend {
    overview_hits: AtomicUsize,
    overview_failing: AtomicBool,
    cost_trend_hits: AtomicUsize,
    slo_hits: AtomicUsize,
}

async fn overview(State(backend): State<Arc<Backend>>) -> Response {
    backend.overview_hits.fetch_add(1, Ordering::SeqCst);
    if backend.overview_failing.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({
        "total_cost_usd": 42.5,
        "total_requests": 1200,
        "error_rate": 0.8,
        "avg_latency_ms": 310
    }))
    .into_response()
}

async fn cost_trend(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.cost_trend_hits.fetch_add(1, Ordering::SeqCst);
    let range = params.get("range").cloned().unwrap_or_default();

    // The 24h range responds slowly so tests can race it against a filter
    // change.
    if range == "24h" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    Json(json!({
        "data": [
            {"timestamp": "2024-01-01T00:00:00Z", "model": range, "total_cost_usd": 1.0}
        ]
    }))
    .into_response()
}

async fn slo_status(State(backend): State<Arc<Backend>>) -> Response {
    backend.slo_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({"data": [{"timestamp": "2024-01-01T00:00:00Z", "p95_ms": 420.0}]}))
        .into_response()
}

async fn spawn_backend() -> (Arc<Backend>, String) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/v1/metrics/overview", get(overview))
        .route("/api/v1/costs/trend", get(cost_trend))
        .route("/api/v1/slo/status", get(slo_status))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (backend, format!("http://{addr}"))
}

fn cache_for(base_url: &str) -> (Arc<FilterStore>, Arc<QueryCache>) {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        ..Default::default()
    };
    let client = Arc::new(ApiClient::new(&config).unwrap());
    let filters = Arc::new(FilterStore::new());
    let cache = Arc::new(QueryCache::new(client, filters.clone()));
    (filters, cache)
}

#[tokio::test]
async fn concurrent_identical_reads_share_one_fetch() {
    let (backend, base_url) = spawn_backend().await;
    let (_filters, cache) = cache_for(&base_url);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(
            async move { cache.read(Endpoint::Overview).await },
        ));
    }

    for task in tasks {
        let snapshot = task.await.unwrap();
        assert_eq!(snapshot.status, QueryStatus::Success);
        assert!(snapshot.data.is_some());
    }

    assert_eq!(backend.overview_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fresh_entries_are_served_from_cache() {
    let (backend, base_url) = spawn_backend().await;
    let (_filters, cache) = cache_for(&base_url);

    cache.read(Endpoint::Overview).await;
    cache.read(Endpoint::Overview).await;

    assert_eq!(backend.overview_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn error_retains_last_good_data() {
    let (backend, base_url) = spawn_backend().await;
    let (_filters, cache) = cache_for(&base_url);

    let first = cache.read(Endpoint::Overview).await;
    assert_eq!(first.status, QueryStatus::Success);
    let good = first.data.clone().unwrap();

    backend.overview_failing.store(true, Ordering::SeqCst);
    cache.refresh(Endpoint::Overview);

    let second = cache.read(Endpoint::Overview).await;
    assert_eq!(second.status, QueryStatus::Error);
    assert!(second.error.is_some());
    // The previous value stays readable, flagged stale.
    assert_eq!(second.data.as_deref(), Some(good.as_ref()));
    assert!(second.stale);
}

#[tokio::test]
async fn recovery_after_error_clears_staleness() {
    let (backend, base_url) = spawn_backend().await;
    let (_filters, cache) = cache_for(&base_url);

    cache.read(Endpoint::Overview).await;
    backend.overview_failing.store(true, Ordering::SeqCst);
    cache.refresh(Endpoint::Overview);
    cache.read(Endpoint::Overview).await;

    backend.overview_failing.store(false, Ordering::SeqCst);
    cache.refresh(Endpoint::Overview);
    let snapshot = cache.read(Endpoint::Overview).await;

    assert_eq!(snapshot.status, QueryStatus::Success);
    assert!(snapshot.error.is_none());
    assert!(!snapshot.stale);
}

#[tokio::test]
async fn undeclared_dimension_change_does_not_refetch() {
    let (backend, base_url) = spawn_backend().await;
    let (filters, cache) = cache_for(&base_url);

    cache.read(Endpoint::SloStatus).await;
    assert_eq!(backend.slo_hits.load(Ordering::SeqCst), 1);

    // SLO status does not declare the version dimension.
    let change = filters.apply(FilterPatch::new().version(Some("2.1.0")));
    cache.invalidate(&change);
    let snapshot = cache.read(Endpoint::SloStatus).await;
    assert_eq!(snapshot.status, QueryStatus::Success);
    assert_eq!(backend.slo_hits.load(Ordering::SeqCst), 1);

    // A declared dimension does trigger a refetch.
    let change = filters.apply(FilterPatch::new().department(Some("research")));
    cache.invalidate(&change);
    cache.read(Endpoint::SloStatus).await;
    assert_eq!(backend.slo_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stale_response_does_not_overwrite_newer_filters() {
    let (backend, base_url) = spawn_backend().await;
    let (filters, cache) = cache_for(&base_url);

    let change = filters.apply(FilterPatch::new().range("24h"));
    cache.invalidate(&change);

    // Start the slow 24h fetch, then switch to 7d while it is in flight.
    let slow = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.read(Endpoint::CostTrend).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let change = filters.apply(FilterPatch::new().range("7d"));
    cache.invalidate(&change);

    let current = cache.read(Endpoint::CostTrend).await;
    assert_eq!(current.status, QueryStatus::Success);
    let payload = current.data.clone().unwrap();
    assert_eq!(payload["data"][0]["model"], "7d");

    // Let the stale 24h response arrive, then confirm it was discarded.
    let stale = slow.await.unwrap();
    assert!(stale.data.is_none());

    let after = cache.read(Endpoint::CostTrend).await;
    assert_eq!(after.data.unwrap()["data"][0]["model"], "7d");
    assert_eq!(backend.cost_trend_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn agent_options_are_not_fetched_without_parent_filter() {
    let (_backend, base_url) = spawn_backend().await;
    let (_filters, cache) = cache_for(&base_url);

    // No route exists for agent options; a request would surface as an
    // error. Idle proves nothing was fetched.
    let snapshot = cache.read(Endpoint::AgentOptions).await;
    assert_eq!(snapshot.status, QueryStatus::Idle);
    assert!(snapshot.data.is_none());
}
