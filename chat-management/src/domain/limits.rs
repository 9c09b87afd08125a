//! Normative default limits (compiled defaults; configurable via
//! `ChatManagementConfig::rate_limit` / `jwt`).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Limits {
    pub otp_validity: Duration,
    pub otp_request_limit_per_phone: u32,
    pub otp_request_window_per_phone: Duration,
    pub otp_request_limit_per_ip: u32,
    pub otp_request_window_per_ip: Duration,
    pub otp_verify_limit: u32,
    pub otp_verify_window: Duration,
    pub max_otp_verify_attempts: u32,
    pub lockout_ttl: Duration,
    pub access_token_lifetime: Duration,
    pub refresh_token_lifetime: Duration,
    pub max_sessions_per_user: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            otp_validity: Duration::from_secs(5 * 60),
            otp_request_limit_per_phone: 3,
            otp_request_window_per_phone: Duration::from_secs(15 * 60),
            otp_request_limit_per_ip: 10,
            otp_request_window_per_ip: Duration::from_secs(15 * 60),
            otp_verify_limit: 5,
            otp_verify_window: Duration::from_secs(15 * 60),
            max_otp_verify_attempts: 5,
            lockout_ttl: Duration::from_secs(15 * 60),
            access_token_lifetime: Duration::from_secs(60 * 60),
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 60 * 60),
            max_sessions_per_user: 5,
        }
    }
}

/// Normative per-dependency timeouts (§5).
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub storage: Duration,
    pub cache: Duration,
    pub inter_service: Duration,
    pub graceful_shutdown: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            storage: Duration::from_secs(5),
            cache: Duration::from_secs(2),
            inter_service: Duration::from_secs(10),
            graceful_shutdown: Duration::from_secs(30),
        }
    }
}
