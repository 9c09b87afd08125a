//! spec.md section 8, scenario 5: two VerifyOTP calls for a never-seen
//! phone, on different devices, racing under a clock pinned to a single
//! instant. Exactly one must win registration; the other falls back to
//! login against the same user.

mod common;

use chrono::Utc;
use common::Harness;

#[tokio::test]
async fn concurrent_verify_on_a_new_phone_registers_exactly_once() {
    let harness = Harness::at(Utc::now());

    harness
        .auth
        .request_otp("+15551234567", "192.168.1.1")
        .await
        .unwrap();
    let code = harness.last_otp_code("+15551234567").await;

    // Same code, same phone, two devices - the shared OTP record lets both
    // calls pass verification; only one can win the user-creation race.
    let (left, right) = tokio::join!(
        harness.auth.verify_otp("+15551234567", &code, "device-left"),
        harness.auth.verify_otp("+15551234567", &code, "device-right"),
    );

    let left = left.expect("left call succeeds, either as registration or login");
    let right = right.expect("right call succeeds, either as registration or login");

    assert_ne!(left.is_new_user, right.is_new_user, "exactly one side must win registration");
    assert_eq!(left.user_id.as_str(), right.user_id.as_str());
    assert_ne!(left.session_id.as_str(), right.session_id.as_str());
}
