//! spec.md section 8, scenario 3: refresh rotation, then reuse detection
//! kills the session.

mod common;

use chat_management::error::DomainError;
use chat_management::ports::SessionStore;
use chrono::Utc;
use common::{domain_error, Harness};

#[tokio::test]
async fn rotation_then_reuse_of_prior_token_kills_the_session() {
    let harness = Harness::at(Utc::now());

    harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .unwrap();
    let code = harness.last_otp_code("+15551234567").await;
    let registered = harness
        .auth
        .verify_otp("+15551234567", &code, "device-abc")
        .await
        .unwrap();

    let rotated = harness
        .auth
        .refresh_tokens(&registered.access_token, &registered.refresh_token, "device-abc")
        .await
        .expect("first rotation succeeds");
    assert_ne!(rotated.refresh_token, registered.refresh_token);

    // Presenting the scenario-1 (now previous-generation) refresh token
    // again is reuse: the attacker and the legitimate client race, and the
    // system must lose on the attacker's side by killing the session.
    let reuse = harness
        .auth
        .refresh_tokens(&registered.access_token, &registered.refresh_token, "device-abc")
        .await
        .expect_err("reusing the rotated-away token must fail");
    assert_eq!(domain_error(&reuse), Some(DomainError::RefreshTokenReuse));

    // The legitimate client's new token is now useless too - the session
    // is gone.
    let after_kill = harness
        .auth
        .refresh_tokens(&rotated.access_token, &rotated.refresh_token, "device-abc")
        .await
        .expect_err("session was killed by the reuse detection");
    assert_eq!(domain_error(&after_kill), Some(DomainError::SessionRevoked));
}

#[tokio::test]
async fn rotation_is_monotonic_and_hashes_never_repeat() {
    let harness = Harness::at(Utc::now());

    harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .unwrap();
    let code = harness.last_otp_code("+15551234567").await;
    let registered = harness
        .auth
        .verify_otp("+15551234567", &code, "device-abc")
        .await
        .unwrap();

    let before = harness
        .store
        .list_by_user(registered.user_id.as_str())
        .await
        .unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].token_generation, 0);

    let rotated = harness
        .auth
        .refresh_tokens(&registered.access_token, &registered.refresh_token, "device-abc")
        .await
        .unwrap();

    let after = harness
        .store
        .list_by_user(registered.user_id.as_str())
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].token_generation, 1);
    assert_ne!(after[0].refresh_token_hash, before[0].refresh_token_hash);
    assert_eq!(after[0].prev_token_hash.as_deref(), Some(before[0].refresh_token_hash.as_str()));
    assert_ne!(rotated.refresh_token, registered.refresh_token);
}

#[tokio::test]
async fn device_mismatch_on_refresh_is_rejected() {
    let harness = Harness::at(Utc::now());

    harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .unwrap();
    let code = harness.last_otp_code("+15551234567").await;
    let registered = harness
        .auth
        .verify_otp("+15551234567", &code, "device-abc")
        .await
        .unwrap();

    let err = harness
        .auth
        .refresh_tokens(&registered.access_token, &registered.refresh_token, "device-other")
        .await
        .expect_err("wrong device must be rejected");
    assert_eq!(domain_error(&err), Some(DomainError::DeviceMismatch));
}
