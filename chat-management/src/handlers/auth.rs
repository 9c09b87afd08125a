//! HTTP handlers for refresh-token rotation and logout.

use axum::extract::{Json, State};
use axum::http::StatusCode;

use crate::dtos::{LogoutRequest, RefreshTokensRequest, RefreshTokensResponse};
use crate::wire::http::map_error;
use crate::AppState;

/// POST /v1/auth/refresh
pub async fn refresh_tokens(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokensRequest>,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    match state
        .auth
        .refresh_tokens(&req.access_token, &req.refresh_token, &req.device_id)
        .await
    {
        Ok(out) => (
            StatusCode::OK,
            Json(RefreshTokensResponse {
                access_token: out.access_token,
                refresh_token: out.refresh_token,
                access_token_expiry: out.access_token_expiry.timestamp_millis(),
            }),
        )
            .into_response(),
        Err(e) => map_error(&e),
    }
}

/// POST /v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    match state.auth.logout(&req.access_token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => map_error(&e),
    }
}
