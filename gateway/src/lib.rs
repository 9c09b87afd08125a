//! Connection Plane scaffold.
//!
//! Owns the latency-oriented half of the three-plane architecture described
//! in spec.md section 2: a persistent bidirectional transport (WebSocket)
//! that clients hold open for message delivery. Per spec.md section 1 this
//! component is "scaffolded but not substantively implemented" - the only
//! contract it presently consumes from [`chat_management`] is the access
//! token's claim shape, so that a bearer token minted by Chat Management's
//! `VerifyOTP`/`RefreshTokens` can be structurally recognized here without
//! duplicating the token taxonomy.

pub mod bearer;
pub mod config;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::GatewayConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

async fn readiness_check() -> &'static str {
    "ready"
}

/// Upgrades to a WebSocket and immediately closes with "not implemented".
///
/// The full multiplexer - demultiplexing per-connection frames into
/// Ingest-bound sequencing requests and Fanout-bound delivery acks - is the
/// Gateway's reason for existing, but per spec.md section 1 it is out of
/// this core's scope; only the bearer-token recognition in [`bearer`] is
/// exercised today.
async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, _state: AppState) {
    let _ = socket
        .send(Message::Close(Some(axum::extract::ws::CloseFrame {
            code: 1011,
            reason: "gateway dataplane not implemented".into(),
        })))
        .await;
}
