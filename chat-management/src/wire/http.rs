//! `DomainError` -> HTTP status + machine-readable code, mirroring the shape
//! of `service_core::error::AppError`'s `IntoResponse` but against this
//! crate's closed sentinel set.

use crate::error::DomainError;
use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    error: String,
}

fn status_and_code(kind: DomainError) -> (StatusCode, &'static str) {
    use DomainError::*;
    match kind {
        NotFound => (StatusCode::NOT_FOUND, "not_found"),
        AlreadyExists => (StatusCode::CONFLICT, "already_exists"),
        DuplicateMessage => (StatusCode::OK, "duplicate_message"),
        Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        InvalidOTP => (StatusCode::UNAUTHORIZED, "invalid_otp"),
        OTPExpired => (StatusCode::UNAUTHORIZED, "otp_expired"),
        DeviceMismatch => (StatusCode::UNAUTHORIZED, "device_mismatch"),
        InvalidRefreshToken => (StatusCode::UNAUTHORIZED, "invalid_refresh_token"),
        RefreshTokenReuse => (StatusCode::UNAUTHORIZED, "refresh_token_reuse"),
        SessionExpired => (StatusCode::UNAUTHORIZED, "session_expired"),
        SessionRevoked => (StatusCode::UNAUTHORIZED, "session_revoked"),
        Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        NotMember => (StatusCode::FORBIDDEN, "not_a_member"),
        InvalidInput | EmptyId | InvalidId => (StatusCode::BAD_REQUEST, "invalid_message"),
        InvalidPhoneNumber => (StatusCode::BAD_REQUEST, "invalid_phone_number"),
        MessageTooLarge => (StatusCode::BAD_REQUEST, "message_too_large"),
        InvalidContentType => (StatusCode::BAD_REQUEST, "invalid_message"),
        RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
        PhoneRateLimited => (StatusCode::TOO_MANY_REQUESTS, "phone_rate_limited"),
        IPRateLimited => (StatusCode::TOO_MANY_REQUESTS, "ip_rate_limited"),
        SlowConsumer => (StatusCode::TOO_MANY_REQUESTS, "slow_consumer"),
        MaxSessionsExceeded => (StatusCode::TOO_MANY_REQUESTS, "max_sessions_exceeded"),
        Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
        ConfigRequired => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

pub struct HttpError(pub DomainError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(self.0);
        (
            status,
            Json(ErrorBody {
                code: code.to_string(),
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Maps any error to an HTTP response. Total: unmapped errors surface as
/// 500 with a non-informative body.
pub fn map_error(err: &anyhow::Error) -> Response {
    match DomainError::from_anyhow(err) {
        Some(kind) => HttpError(kind).into_response(),
        None => {
            tracing::error!(error = %err, "unmapped error reached http boundary");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    code: "internal_error".to_string(),
                    error: "internal error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_every_sentinel_maps() {
        for kind in DomainError::ALL {
            let (status, code) = status_and_code(*kind);
            assert!(!code.is_empty());
            // DuplicateMessage is the one success-as-idempotency-signal case.
            if *kind != DomainError::DuplicateMessage {
                assert!(status.is_client_error() || status.is_server_error());
            }
        }
    }

    #[test]
    fn stable_under_wrapping() {
        use anyhow::Context;
        for kind in DomainError::ALL {
            let (bare_status, _) = status_and_code(*kind);
            let wrapped: anyhow::Error = anyhow::Error::from(*kind).context("wrapped context");
            let response = map_error(&wrapped);
            assert_eq!(bare_status, response.status());
        }
    }

    #[test]
    fn duplicate_message_is_success_not_failure() {
        let (status, code) = status_and_code(DomainError::DuplicateMessage);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(code, "duplicate_message");
    }

    #[test]
    fn unmapped_is_internal_server_error() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(map_error(&err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
