use axum::extract::State;
use axum::response::IntoResponse;

use crate::AppState;

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}
