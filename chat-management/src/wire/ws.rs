//! `DomainError` -> WebSocket close code + machine-readable reason. There is
//! no teacher precedent for this mapper (the retrieved corpus never closes
//! a socket with a structured reason); it follows the same total-match
//! shape as `wire::rpc` and `wire::http`, using the 4000-4099 private range
//! for domain-specific closes and the standard codes for generic cases.

use crate::error::DomainError;

fn close_code_and_reason(kind: DomainError) -> (u16, &'static str) {
    use DomainError::*;
    match kind {
        NotFound => (4004, "not_found"),
        AlreadyExists => (4009, "already_exists"),
        DuplicateMessage => (4009, "duplicate_message"),
        Unauthorized => (4001, "unauthorized"),
        InvalidOTP => (4001, "invalid_otp"),
        OTPExpired => (4001, "otp_expired"),
        DeviceMismatch => (4001, "device_mismatch"),
        InvalidRefreshToken => (4001, "invalid_refresh_token"),
        RefreshTokenReuse => (4001, "refresh_token_reuse"),
        SessionExpired => (4001, "session_expired"),
        SessionRevoked => (4001, "session_revoked"),
        Forbidden => (4003, "forbidden"),
        NotMember => (4003, "not_a_member"),
        InvalidInput | EmptyId | InvalidId | InvalidContentType => (4000, "invalid_message"),
        InvalidPhoneNumber => (4000, "invalid_phone_number"),
        MessageTooLarge => (4013, "message_too_large"),
        RateLimited => (4029, "rate_limited"),
        PhoneRateLimited => (4029, "phone_rate_limited"),
        IPRateLimited => (4029, "ip_rate_limited"),
        SlowConsumer => (4029, "slow_consumer"),
        MaxSessionsExceeded => (4029, "max_sessions_exceeded"),
        Unavailable => (1013, "service_unavailable"),
        ConfigRequired => (1011, "internal_error"),
    }
}

pub struct WsClose {
    pub code: u16,
    pub reason: &'static str,
}

impl From<DomainError> for WsClose {
    fn from(kind: DomainError) -> Self {
        let (code, reason) = close_code_and_reason(kind);
        WsClose { code, reason }
    }
}

/// Maps any error to a close frame. Total: unmapped errors close as 1011
/// ("internal error") per RFC 6455.
pub fn map_error(err: &anyhow::Error) -> WsClose {
    match DomainError::from_anyhow(err) {
        Some(kind) => kind.into(),
        None => {
            tracing::error!(error = %err, "unmapped error reached websocket boundary");
            WsClose {
                code: 1011,
                reason: "internal_error",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_every_sentinel_maps() {
        for kind in DomainError::ALL {
            let (code, reason) = close_code_and_reason(*kind);
            assert!(code >= 1000);
            assert!(!reason.is_empty());
        }
    }

    #[test]
    fn stable_under_wrapping() {
        use anyhow::Context;
        for kind in DomainError::ALL {
            let (bare_code, bare_reason) = close_code_and_reason(*kind);
            let wrapped: anyhow::Error = anyhow::Error::from(*kind).context("wrapped context");
            let mapped = map_error(&wrapped);
            assert_eq!(bare_code, mapped.code, "{:?} code changed under wrap", kind);
            assert_eq!(bare_reason, mapped.reason, "{:?} reason changed under wrap", kind);
        }
    }

    #[test]
    fn unmapped_is_internal_error() {
        let err = anyhow::anyhow!("boom");
        let close = map_error(&err);
        assert_eq!(close.code, 1011);
        assert_eq!(close.reason, "internal_error");
    }

    #[test]
    fn specific_mappings() {
        let close: WsClose = DomainError::RefreshTokenReuse.into();
        assert_eq!(close.code, 4001);
        assert_eq!(close.reason, "refresh_token_reuse");

        let close: WsClose = DomainError::MessageTooLarge.into();
        assert_eq!(close.code, 4013);
    }
}
