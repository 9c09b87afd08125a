//! HTTP handlers for the OTP bootstrap flows, bridging
//! [`crate::services::auth_service::AuthService`] to JSON over REST the way
//! the teacher's `handlers::auth` bridges its `JwtService`/`Database` pair.

use axum::extract::{ConnectInfo, Json, State};
use axum::http::StatusCode;
use std::net::SocketAddr;

use crate::dtos::{RequestOtpRequest, RequestOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
use crate::wire::http::map_error;
use crate::AppState;

/// POST /v1/auth/otp/request
pub async fn request_otp(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RequestOtpRequest>,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    match state
        .auth
        .request_otp(&req.phone, &addr.ip().to_string())
        .await
    {
        Ok(out) => (
            StatusCode::OK,
            Json(RequestOtpResponse {
                expires_at: out.expires_at.timestamp_millis(),
                retry_after_seconds: out.retry_after_seconds,
            }),
        )
            .into_response(),
        Err(e) => map_error(&e),
    }
}

/// POST /v1/auth/otp/verify
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    match state
        .auth
        .verify_otp(&req.phone, &req.otp_code, &req.device_id)
        .await
    {
        Ok(out) => (
            StatusCode::OK,
            Json(VerifyOtpResponse {
                user_id: out.user_id.as_str().to_string(),
                session_id: out.session_id.as_str().to_string(),
                access_token: out.access_token,
                refresh_token: out.refresh_token,
                is_new_user: out.is_new_user,
                access_token_expiry: out.access_token_expiry.timestamp_millis(),
            }),
        )
            .into_response(),
        Err(e) => map_error(&e),
    }
}
