//! spec.md section 8, scenarios 1-2: happy-path registration and OTP
//! replay rejection.

mod common;

use chat_management::error::DomainError;
use chrono::{Duration, Utc};
use common::{domain_error, Harness};

#[tokio::test]
async fn happy_path_new_user_registers_and_mints_tokens() {
    let start = Utc::now();
    let harness = Harness::at(start);

    let requested = harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .expect("request otp");

    assert_eq!(requested.retry_after_seconds, 60);
    assert_eq!(requested.expires_at, start + Duration::minutes(5));

    let code = harness.last_otp_code("+15551234567").await;

    let verified = harness
        .auth
        .verify_otp("+15551234567", &code, "device-abc")
        .await
        .expect("verify otp");

    assert!(verified.is_new_user);
    assert!(!verified.access_token.is_empty());
    assert_eq!(verified.refresh_token.len(), 43);

    let claims = harness
        .minter
        .validate(&verified.access_token)
        .expect("mint must validate under the same minter");
    assert_eq!(claims.sub, verified.user_id.as_str());
}

#[tokio::test]
async fn replaying_a_consumed_otp_is_rejected() {
    let start = Utc::now();
    let harness = Harness::at(start);

    harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .expect("request otp");
    let code = harness.last_otp_code("+15551234567").await;

    harness
        .auth
        .verify_otp("+15551234567", &code, "device-abc")
        .await
        .expect("first verify succeeds");

    let replay = harness
        .auth
        .verify_otp("+15551234567", &code, "device-abc")
        .await
        .expect_err("replay must fail");

    assert_eq!(domain_error(&replay), Some(DomainError::InvalidOTP));
}

#[tokio::test]
async fn idempotent_retry_returns_existing_expiry_without_new_code() {
    let start = Utc::now();
    let harness = Harness::at(start);

    let first = harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .expect("first request");
    let second = harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .expect("second request hits the active-record path");

    assert_eq!(first.expires_at, second.expires_at);

    // Wait for the first dispatch to land on its detached task before
    // asserting no second one followed it.
    harness.last_otp_code("+15551234567").await;
    assert_eq!(harness.sms.sent().len(), 1, "no second SMS should be dispatched");
}
