//! HTTP request-outcome metrics, adapted to the struct-based
//! [`crate::services::metrics::Metrics`] via `State<AppState>` extraction
//! instead of the teacher's global `OnceLock` counters.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

use crate::AppState;

pub async fn metrics_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    state.metrics.record_outcome(&path, &status);
    state
        .metrics
        .request_duration_seconds
        .with_label_values(&[&path])
        .observe(duration);

    response
}
