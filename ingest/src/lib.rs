//! Durability Plane scaffold.
//!
//! Owns the correctness-oriented half of the three-plane architecture
//! (spec.md section 2): per-conversation total message ordering and
//! persistence. Per spec.md section 1 this component is "scaffolded but not
//! substantively implemented" - [`sequencer`] models only the shape of the
//! per-chat `Sequence` counter that Chat Management's wire contract (the
//! message-ack payload) assumes exists downstream.

pub mod config;
pub mod sequencer;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::IngestConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

async fn readiness_check() -> &'static str {
    "ready"
}
