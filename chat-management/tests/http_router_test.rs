//! HTTP surface smoke tests: liveness/readiness probes and JWKS exposure
//! through the real `build_router`, wired to the in-memory adapters the
//! way `main.rs` wires Postgres/Redis in production.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chat_management::domain::SecretBytes;
use chat_management::services::auth_service::{AuthService, AuthServiceDeps};
use chat_management::services::metrics::Metrics;
use chat_management::token::keystore::{SharedKeyStore, StaticKeyStore};
use chat_management::token::minter::Minter;
use chat_management::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const TEST_PRIVATE_KEY: &str = include_str!("fixtures/test_rsa_key.pem");

fn test_state() -> AppState {
    let config = chat_management::config::ChatManagementConfig::for_test();

    let clock: Arc<dyn chat_management::clock::Clock> =
        Arc::new(chat_management::clock::SystemClock);
    let store = Arc::new(chat_management::adapters::memory::MemoryAuthStore::new());
    let keys: SharedKeyStore = Arc::new(StaticKeyStore::single("kid-test", TEST_PRIVATE_KEY).unwrap());
    let minter = Arc::new(Minter::new(
        keys.clone(),
        clock.clone(),
        "chat-management-test",
        "chat-clients-test",
        std::time::Duration::from_secs(3600),
    ));
    let metrics = Arc::new(Metrics::new().unwrap());

    let auth = Arc::new(AuthService::new(AuthServiceDeps {
        otp_store: store.clone(),
        user_store: store.clone(),
        session_store: store.clone(),
        transactor: store.clone(),
        rate_limiter: Arc::new(chat_management::adapters::memory::MemoryRateLimiter::new()),
        revocation: Arc::new(chat_management::adapters::memory::MemoryRevocationStore::new()),
        sms: Arc::new(chat_management::adapters::memory::MemorySmsProvider::new()),
        clock,
        minter,
        pepper: SecretBytes::new(b"test-pepper".to_vec()),
        limits: Default::default(),
        metrics: metrics.clone(),
    }));

    AppState {
        config: Arc::new(config),
        auth,
        keys,
        metrics,
    }
}

#[tokio::test]
async fn health_and_ready_report_ok() {
    let router = build_router(test_state());

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn jwks_exposes_the_active_key_as_rfc7517() {
    let router = build_router(test_state());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/.well-known/jwks.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let keys = json["keys"].as_array().expect("keys array");
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["kid"], "kid-test");
    assert_eq!(keys[0]["kty"], "RSA");
    assert_eq!(keys[0]["alg"], "RS256");
}

#[tokio::test]
async fn metrics_endpoint_renders_prometheus_text() {
    let router = build_router(test_state());

    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("auth_request_outcomes_total") || text.is_empty());
}
