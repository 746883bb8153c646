//! Rate limiting behavior through the full HTTP pipeline.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use common::{test_router, StaticResolver};
use edge_gateway::config::GatewayConfig;

fn api_get(path: &str, client: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("host", "shop.example")
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

fn small_limit_config(max_requests: u32) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window_secs = 1;
    config
}

#[tokio::test]
async fn api_requests_within_the_window_are_allowed() {
    let (router, _) = test_router(small_limit_config(5), StaticResolver::anonymous());

    for _ in 0..5 {
        let response = router
            .clone()
            .oneshot(api_get("/api/products", "203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn request_over_the_limit_is_rejected_with_json_429() {
    let (router, _) = test_router(small_limit_config(3), StaticResolver::anonymous());

    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(api_get("/api/products", "203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(api_get("/api/products", "203.0.113.9"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Too many requests" }));
}

#[tokio::test]
async fn window_expiry_grants_a_fresh_counter() {
    let (router, _) = test_router(small_limit_config(2), StaticResolver::anonymous());

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(api_get("/api/products", "203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let blocked = router
        .clone()
        .oneshot(api_get("/api/products", "203.0.113.9"))
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(1_100)).await;

    let response = router
        .oneshot(api_get("/api/products", "203.0.113.9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn distinct_clients_never_share_rate_state() {
    let (router, _) = test_router(small_limit_config(1), StaticResolver::anonymous());

    let first = router
        .clone()
        .oneshot(api_get("/api/products", "203.0.113.9"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let exhausted = router
        .clone()
        .oneshot(api_get("/api/products", "203.0.113.9"))
        .await
        .unwrap();
    assert_eq!(exhausted.status(), StatusCode::TOO_MANY_REQUESTS);

    let other_client = router
        .oneshot(api_get("/api/products", "198.51.100.4"))
        .await
        .unwrap();
    assert_eq!(other_client.status(), StatusCode::OK);
}

#[tokio::test]
async fn unidentifiable_clients_share_the_sentinel_bucket() {
    let (router, store) = test_router(small_limit_config(1), StaticResolver::anonymous());

    // No forwarding headers and no peer address: both requests land on the
    // shared "unknown" key, so the second is throttled.
    let bare = |path: &str| {
        Request::builder()
            .uri(path)
            .header("host", "shop.example")
            .body(Body::empty())
            .unwrap()
    };

    let first = router.clone().oneshot(bare("/api/products")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router.oneshot(bare("/api/cart")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(store.tracked_keys(), 1);
}

#[tokio::test]
async fn non_api_paths_are_never_throttled() {
    let (router, store) = test_router(small_limit_config(1), StaticResolver::anonymous());

    for _ in 0..5 {
        let response = router
            .clone()
            .oneshot(api_get("/products/7", "203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(store.tracked_keys(), 0);
}

#[tokio::test]
async fn disabling_the_limiter_allows_unlimited_api_traffic() {
    let mut config = small_limit_config(1);
    config.rate_limit.enabled = false;
    let (router, _) = test_router(config, StaticResolver::anonymous());

    for _ in 0..10 {
        let response = router
            .clone()
            .oneshot(api_get("/api/products", "203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
