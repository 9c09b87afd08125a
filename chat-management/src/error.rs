//! The canonical domain-error taxonomy. A small, closed sentinel set; three
//! wire mappers in `wire::{rpc, http, ws}` give it a bit-exact mapping to
//! RPC status codes, HTTP status+code, and WebSocket close-code+reason.
//!
//! Ports and services return `anyhow::Error` built by wrapping a
//! `DomainError` with a contextual prefix (`.context("create OTP")`); the
//! wrappers recover the root `DomainError` via `from_anyhow`, so wrapping
//! never loses classification.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    // Validation
    #[error("empty id")]
    EmptyId,
    #[error("invalid id")]
    InvalidId,
    #[error("invalid input")]
    InvalidInput,
    #[error("message too large")]
    MessageTooLarge,
    #[error("invalid content type")]
    InvalidContentType,
    #[error("invalid phone number")]
    InvalidPhoneNumber,

    // Resource
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("duplicate message")]
    DuplicateMessage,

    // Permission
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not a member")]
    NotMember,

    // Auth-specific
    #[error("invalid otp")]
    InvalidOTP,
    #[error("otp expired")]
    OTPExpired,
    #[error("device mismatch")]
    DeviceMismatch,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("refresh token reuse")]
    RefreshTokenReuse,
    #[error("session expired")]
    SessionExpired,
    #[error("session revoked")]
    SessionRevoked,
    #[error("max sessions exceeded")]
    MaxSessionsExceeded,

    // Throttling
    #[error("rate limited")]
    RateLimited,
    #[error("phone rate limited")]
    PhoneRateLimited,
    #[error("ip rate limited")]
    IPRateLimited,
    #[error("slow consumer")]
    SlowConsumer,

    // Availability
    #[error("unavailable")]
    Unavailable,

    // Configuration
    #[error("config required")]
    ConfigRequired,
}

impl DomainError {
    /// Every sentinel, for completeness tests across the three wire
    /// mappers (`wire::{rpc, http, ws}`).
    pub const ALL: &'static [DomainError] = &[
        DomainError::EmptyId,
        DomainError::InvalidId,
        DomainError::InvalidInput,
        DomainError::MessageTooLarge,
        DomainError::InvalidContentType,
        DomainError::InvalidPhoneNumber,
        DomainError::NotFound,
        DomainError::AlreadyExists,
        DomainError::DuplicateMessage,
        DomainError::Unauthorized,
        DomainError::Forbidden,
        DomainError::NotMember,
        DomainError::InvalidOTP,
        DomainError::OTPExpired,
        DomainError::DeviceMismatch,
        DomainError::InvalidRefreshToken,
        DomainError::RefreshTokenReuse,
        DomainError::SessionExpired,
        DomainError::SessionRevoked,
        DomainError::MaxSessionsExceeded,
        DomainError::RateLimited,
        DomainError::PhoneRateLimited,
        DomainError::IPRateLimited,
        DomainError::SlowConsumer,
        DomainError::Unavailable,
        DomainError::ConfigRequired,
    ];

    /// Recover the root sentinel from an `anyhow::Error` chain built by
    /// repeated `.context(...)` wrapping. Any error whose chain contains no
    /// `DomainError` is unmapped - all three wire mappers treat that as
    /// generic internal.
    pub fn from_anyhow(err: &anyhow::Error) -> Option<DomainError> {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<DomainError>())
            .copied()
    }
}

/// Extension trait for wrapping a `DomainError` (or any error) with a
/// contextual prefix while preserving `DomainError::from_anyhow` matching.
pub trait WrapError<T> {
    fn wrap(self, context: &'static str) -> anyhow::Result<T>;
}

impl<T> WrapError<T> for Result<T, DomainError> {
    fn wrap(self, context: &'static str) -> anyhow::Result<T> {
        use anyhow::Context;
        self.map_err(anyhow::Error::from).context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn wrapping_preserves_root_kind() {
        let err: anyhow::Error = anyhow::Error::from(DomainError::InvalidOTP)
            .context("verify otp")
            .context("handle request");
        assert_eq!(DomainError::from_anyhow(&err), Some(DomainError::InvalidOTP));
    }

    #[test]
    fn unmapped_error_has_no_root_kind() {
        let err = anyhow::anyhow!("some infrastructure failure");
        assert_eq!(DomainError::from_anyhow(&err), None);
    }

    #[test]
    fn wrap_helper_attaches_context() {
        let err = Err::<(), _>(DomainError::NotFound).wrap("load user").unwrap_err();
        assert_eq!(DomainError::from_anyhow(&err), Some(DomainError::NotFound));
        assert!(err.to_string().contains("load user"));
    }
}
