//! Shared test harness: an `AuthService` wired to the in-memory adapters
//! and a controllable clock, mirroring how `main.rs` wires the production
//! adapters but swapping Postgres/Redis for [`chat_management::adapters::memory`]
//! so the end-to-end scenarios in spec.md section 8 run without external
//! services.

#![allow(dead_code)]

use chat_management::adapters::memory::{
    MemoryAuthStore, MemoryRateLimiter, MemoryRevocationStore, MemorySmsProvider,
};
use chat_management::clock::{Clock, TestClock};
use chat_management::domain::{Limits, SecretBytes};
use chat_management::services::auth_service::{AuthService, AuthServiceDeps};
use chat_management::services::metrics::Metrics;
use chat_management::token::keystore::{SharedKeyStore, StaticKeyStore};
use chat_management::token::minter::Minter;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa_key.pem");

/// Everything a scenario test needs: the service under test, the clock
/// driving it, and a handle onto the SMS sink so tests can pull the
/// internally-generated OTP code the way the spec's test harness does.
pub struct Harness {
    pub auth: Arc<AuthService>,
    pub clock: Arc<TestClock>,
    pub sms: Arc<MemorySmsProvider>,
    pub store: Arc<MemoryAuthStore>,
    pub minter: Arc<Minter>,
    pub revocation: Arc<MemoryRevocationStore>,
}

impl Harness {
    /// Builds a harness pinned to `start`, with normative default limits
    /// except where `configure` overrides them - tests that need a short
    /// rate-limit window (scenario 6's 15-minute window) pass a closure.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self::with_limits(start, Limits::default())
    }

    pub fn with_limits(start: DateTime<Utc>, limits: Limits) -> Self {
        let clock = Arc::new(TestClock::new(start));
        let store = Arc::new(MemoryAuthStore::new());
        let rate_limiter = Arc::new(MemoryRateLimiter::new());
        let revocation = Arc::new(MemoryRevocationStore::new());
        let sms = Arc::new(MemorySmsProvider::new());

        let keys: SharedKeyStore =
            Arc::new(StaticKeyStore::single("kid-test", TEST_PRIVATE_KEY).unwrap());
        let minter = Arc::new(Minter::new(
            keys,
            clock.clone() as Arc<dyn Clock>,
            "chat-management-test",
            "chat-clients-test",
            limits.access_token_lifetime,
        ));

        let metrics = Arc::new(Metrics::new().expect("metrics registry"));

        let auth = Arc::new(AuthService::new(AuthServiceDeps {
            otp_store: store.clone(),
            user_store: store.clone(),
            session_store: store.clone(),
            transactor: store.clone(),
            rate_limiter,
            sms: sms.clone(),
            clock: clock.clone() as Arc<dyn Clock>,
            minter: minter.clone(),
            revocation: revocation.clone(),
            pepper: SecretBytes::new(b"test-pepper-do-not-use-in-prod".to_vec()),
            limits,
            metrics,
        }));

        Self {
            auth,
            clock,
            sms,
            store,
            minter,
            revocation,
        }
    }

    /// Normative limits with every rate-limit/lockout window shortened to
    /// `window`, so tests can exercise boundary and expiry behaviour
    /// without waiting on real wall-clock time (the in-memory rate
    /// limiter's windows are wall-clock-TTL, not driven by the injected
    /// clock - see `adapters::memory`).
    pub fn tight_limits(window: Duration) -> Limits {
        let mut limits = Limits::default();
        limits.otp_request_window_per_phone = window;
        limits.otp_request_window_per_ip = window;
        limits.otp_verify_window = window;
        limits
    }

    /// Pulls the most recently dispatched OTP code for `phone`, panicking
    /// if none was sent - the harness-internal equivalent of "the code
    /// minted internally, obtained via test harness" in spec.md section 8.
    ///
    /// Dispatch happens on a detached task (`AuthService` hands it to a
    /// `TaskTracker` rather than awaiting it inline, so a slow SMS vendor
    /// can never stall the request), so this polls briefly rather than
    /// assuming it has already landed the instant `request_otp` returns.
    pub async fn last_otp_code(&self, phone: &str) -> String {
        for _ in 0..200 {
            if let Some(code) = self
                .sms
                .sent()
                .into_iter()
                .rev()
                .find(|(p, _)| p == phone)
                .map(|(_, code)| code)
            {
                return code;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("no OTP dispatched to {phone}")
    }
}

pub fn domain_error(err: &anyhow::Error) -> Option<chat_management::error::DomainError> {
    chat_management::error::DomainError::from_anyhow(err)
}
