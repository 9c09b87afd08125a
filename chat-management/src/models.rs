//! Persisted record shapes, replacing the teacher's Mongo-oriented
//! `models::{otp_code, refresh_session, user}` with the Postgres-backed
//! records the session core needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpStatus {
    Pending,
    Verified,
}

impl OtpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpStatus::Pending => "pending",
            OtpStatus::Verified => "verified",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "verified" => OtpStatus::Verified,
            _ => OtpStatus::Pending,
        }
    }
}

/// Keyed by `phone_hash`; at most one non-expired `Pending` record exists
/// per hash at a time (enforced by `OTPStore::create`'s absence condition).
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub phone_hash: String,
    pub otp_mac: String,
    pub status: OtpStatus,
    pub attempt_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ttl: i64,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub phone_number: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `(user_id, device_id)` identifies at most one live session; a new
/// session for a device evicts the prior one. `token_generation` is
/// strictly non-decreasing; `refresh_token_hash` is never equal to
/// `prev_token_hash` once a rotation has occurred.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: String,
    pub device_id: String,
    pub refresh_token_hash: String,
    pub prev_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token_generation: i64,
    pub ttl: i64,
}
