//! spec.md section 8, scenario 6: the phone-scoped OTP request rate limit
//! denies at the boundary and recovers once its window rolls over, plus the
//! verify-attempt cap from section 6's limits table.

mod common;

use chat_management::error::DomainError;
use chrono::Utc;
use common::{domain_error, Harness};
use std::time::Duration;

#[tokio::test]
async fn phone_rate_limit_denies_the_fourth_request_then_recovers_after_the_window() {
    let harness = Harness::with_limits(Utc::now(), Harness::tight_limits(Duration::from_millis(200)));

    for _ in 0..3 {
        harness
            .auth
            .request_otp("+15551234567", "192.168.1.1")
            .await
            .expect("first three requests are within the per-phone limit");
    }

    let fourth = harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .expect_err("fourth request within the window must be denied");
    assert_eq!(domain_error(&fourth), Some(DomainError::PhoneRateLimited));

    tokio::time::sleep(Duration::from_millis(250)).await;

    harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .expect("a new window admits requests again");
}

#[tokio::test]
async fn distinct_ips_share_a_phone_but_not_an_ip_bucket() {
    let harness = Harness::with_limits(Utc::now(), Harness::tight_limits(Duration::from_secs(900)));

    for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
        harness
            .auth
            .request_otp("+15551234567", ip)
            .await
            .expect("first three requests share the phone bucket but vary ip");
    }

    let fourth = harness
        .auth
        .request_otp("+15551234567", "10.0.0.4")
        .await
        .expect_err("the phone bucket is exhausted regardless of ip diversity");
    assert_eq!(domain_error(&fourth), Some(DomainError::PhoneRateLimited));
}

#[tokio::test]
async fn repeated_bad_codes_eventually_deny_verification() {
    let harness = Harness::with_limits(Utc::now(), Harness::tight_limits(Duration::from_secs(900)));

    harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .expect("request otp");
    let real_code = harness.last_otp_code("+15551234567").await;
    let wrong_code = if real_code == "000000" { "111111" } else { "000000" };

    // otp_verify_limit and max_otp_verify_attempts are both 5 by default, so
    // five bad attempts each consume the verify rate-limit bucket; the
    // sixth call is denied by the bucket before the attempt-count lockout
    // is ever consulted.
    for _ in 0..5 {
        let err = harness
            .auth
            .verify_otp("+15551234567", wrong_code, "device-abc")
            .await
            .expect_err("wrong code is always rejected");
        assert_eq!(domain_error(&err), Some(DomainError::InvalidOTP));
    }

    let sixth = harness
        .auth
        .verify_otp("+15551234567", wrong_code, "device-abc")
        .await
        .expect_err("sixth attempt is denied by the verify rate limit");
    assert_eq!(domain_error(&sixth), Some(DomainError::RateLimited));

    // Even the correct code is denied once the bucket is exhausted.
    let correct_but_denied = harness
        .auth
        .verify_otp("+15551234567", &real_code, "device-abc")
        .await
        .expect_err("bucket exhaustion blocks every attempt, correct or not");
    assert_eq!(domain_error(&correct_but_denied), Some(DomainError::RateLimited));
}
