//! HTTP+JSON request/response bodies for the AuthService operations. Field
//! names mirror the normative wire contract in `proto/chat/v1/auth.proto`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "invalid_otp")]
    pub code: String,
    #[schema(example = "invalid otp")]
    pub error: String,
}

impl From<crate::error::DomainError> for ErrorResponse {
    fn from(kind: crate::error::DomainError) -> Self {
        Self {
            code: format!("{:?}", kind),
            error: kind.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestOtpRequest {
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestOtpResponse {
    pub expires_at: i64,
    pub retry_after_seconds: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp_code: String,
    pub device_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyOtpResponse {
    pub user_id: String,
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub is_new_user: bool,
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokensRequest {
    pub access_token: String,
    pub refresh_token: String,
    pub device_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshTokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub access_token: String,
}
