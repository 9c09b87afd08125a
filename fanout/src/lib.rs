//! Fanout Plane scaffold.
//!
//! Owns the best-effort half of the three-plane architecture (spec.md
//! section 2): delivery to online recipients, with store-and-forward
//! catch-up for offline ones. Per spec.md section 1 this component is
//! "scaffolded but not substantively implemented" - [`catchup`] models only
//! the shape of the offline-recipient backlog, not real delivery workers.

pub mod catchup;
pub mod config;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::FanoutConfig>,
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
