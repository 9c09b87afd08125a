//! Chat Management: the messaging backbone's authentication and session
//! core. Phone+OTP identity bootstrap, token minting, refresh rotation with
//! reuse detection, and session lifecycle governance - the only
//! substantively implemented component of the wider four-service backbone
//! (Gateway, Ingest, Fanout round out the dataplane).

pub mod adapters;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod db;
pub mod domain;
pub mod dtos;
pub mod error;
pub mod grpc;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod ports;
pub mod services;
pub mod token;
pub mod wire;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ChatManagementConfig;
use crate::services::auth_service::AuthService;
use crate::services::metrics::Metrics;
use crate::token::keystore::SharedKeyStore;

/// Application state shared across HTTP handlers and the gRPC service.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatManagementConfig>,
    pub auth: Arc<AuthService>,
    pub keys: SharedKeyStore,
    pub metrics: Arc<Metrics>,
}

/// Build the HTTP+JSON bridge router: the same four AuthService operations
/// exposed over RPC in `grpc::proto`, plus JWKS exposure and operational
/// endpoints.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/otp/request", post(handlers::otp::request_otp))
        .route("/otp/verify", post(handlers::otp::verify_otp))
        .route("/refresh", post(handlers::auth::refresh_tokens))
        .route("/logout", post(handlers::auth::logout));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/.well-known/jwks.json", get(handlers::well_known::jwks))
        .nest("/v1/auth", auth_routes)
        .with_state(state.clone())
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::metrics::metrics_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::tracing::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "ok"
}

async fn readiness_check() -> &'static str {
    "ready"
}
