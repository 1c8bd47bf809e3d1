mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use common::{gateway, two_live_matches, unavailable, FakeAdapter};
use scores_gateway::config::TtlPolicy;
use scores_gateway::http::{router, AppState};
use scores_gateway::{AccessGate, ProviderRaw};

fn app(adapter: &Arc<FakeAdapter>, gate: AccessGate) -> Router {
    let gateway = gateway(adapter, TtlPolicy::uniform(Duration::from_millis(15_000)));
    router(AppState::new(Arc::new(gateway)), gate)
}

fn get(uri: &str, origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn scores_returns_canonical_matches() {
    let adapter = Arc::new(FakeAdapter::new(|_, _| Ok(two_live_matches())));
    let response = app(&adapter, AccessGate::default())
        .oneshot(get("/scores", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    for m in matches {
        assert!(m["homeTeam"]["id"].is_string());
        assert!(m["goalEvents"].is_array());
        assert!(m.get("venue").is_some());
    }
    assert_eq!(matches[0]["homeTeam"]["id"], "40");
    assert_eq!(matches[0]["score"]["home"], 1);
}

#[tokio::test]
async fn empty_standings_is_an_empty_table() {
    let adapter = Arc::new(FakeAdapter::new(|_, _| Ok(ProviderRaw::Standings(Some(vec![])))));
    let response = app(&adapter, AccessGate::default())
        .oneshot(get("/table/39/2025", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({ "table": [] }));
}

#[tokio::test]
async fn upstream_503_is_reported_and_retried_next_time() {
    let adapter = Arc::new(FakeAdapter::new(|_, _| Err(unavailable())));
    let app = app(&adapter, AccessGate::default());

    let response = app.clone().oneshot(get("/results/39/2025", None)).await.unwrap();
    assert!(response.status().is_server_error());
    let body = json_body(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("UpstreamStatusError"));
    assert!(!message.contains("Service Unavailable"));

    let response = app.oneshot(get("/results/39/2025", None)).await.unwrap();
    assert!(response.status().is_server_error());
    assert_eq!(adapter.calls(), 2);
}

#[tokio::test]
async fn origin_allow_list_is_enforced_before_the_gateway() {
    let adapter = Arc::new(FakeAdapter::new(|_, _| Ok(two_live_matches())));
    let app = app(&adapter, AccessGate::new(["https://a.example"]));

    let rejected = app
        .clone()
        .oneshot(get("/scores", Some("https://b.example")))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);
    assert_eq!(adapter.calls(), 0);

    let allowed = app
        .clone()
        .oneshot(get("/scores", Some("https://a.example")))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(
        allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://a.example"
    );

    let no_origin = app.oneshot(get("/scores", None)).await.unwrap();
    assert_eq!(no_origin.status(), StatusCode::OK);
    assert_eq!(adapter.calls(), 1);
}

#[tokio::test]
async fn invalid_path_parameters_are_rejected_without_upstream_call() {
    let adapter = Arc::new(FakeAdapter::new(|_, _| Ok(two_live_matches())));
    let response = app(&adapter, AccessGate::default())
        .oneshot(get("/upcoming/39%26live%3Dall/2025", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn banner_and_health() {
    let adapter = Arc::new(FakeAdapter::new(|_, _| Ok(two_live_matches())));
    let app = app(&adapter, AccessGate::default());

    let banner = app.clone().oneshot(get("/", None)).await.unwrap();
    let bytes = to_bytes(banner.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Football API Proxy is running!");

    app.clone().oneshot(get("/scores", None)).await.unwrap();
    let health = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body = json_body(health).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "fake");
    assert_eq!(body["cachedKeys"], 1);
    assert_eq!(body["consecutiveErrors"], 0);
}
