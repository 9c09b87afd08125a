//! In-process adapters backing both local-dev wiring and the test suite -
//! the role the teacher's `MockBlacklist` (`services/redis.rs`) plays for
//! `TokenBlacklist`. A TTL here is enforced against real wall-clock time
//! (`std::time::Instant`), independent of the injected [`crate::clock::Clock`]
//! used for business-rule timestamps, mirroring a DynamoDB/Redis TTL
//! attribute rather than the domain clock.

use crate::models::{OtpRecord, OtpStatus, SessionRecord, UserRecord};
use crate::ports::{
    AuthTransactor, NewUserAndSession, OtpStore, RateLimiter, RevocationStore, SessionStore,
    SmsProvider, UserStore,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

fn is_live(expires_at: Instant) -> bool {
    Instant::now() < expires_at
}

/// `ttl` fields are absolute epoch-second expiries (the DynamoDB/Redis TTL
/// convention per the data model), not durations - convert to a wall-clock
/// `Instant` by measuring the remaining distance from real now.
fn instant_from_ttl(ttl_epoch_secs: i64) -> Instant {
    let remaining = ttl_epoch_secs - Utc::now().timestamp();
    Instant::now() + Duration::from_secs(remaining.max(0) as u64)
}

/// Backs `OtpStore`, `UserStore`, `SessionStore`, and `AuthTransactor` over
/// one mutex, so the transactor's two multi-row operations are trivially
/// atomic - the in-memory substitute for a real Postgres transaction.
#[derive(Default)]
pub struct MemoryAuthStore {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    otps: HashMap<String, (OtpRecord, Instant)>,
    users: HashMap<String, UserRecord>,
    users_by_phone: HashMap<String, String>,
    sessions: HashMap<String, (SessionRecord, Instant)>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for MemoryAuthStore {
    async fn create(&self, record: OtpRecord) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");
        if let Some((existing, expiry)) = state.otps.get(&record.phone_hash) {
            if is_live(*expiry) && existing.status == OtpStatus::Pending {
                return Err(anyhow::Error::from(crate::error::DomainError::AlreadyExists)
                    .context("create otp: active record exists"));
            }
        }
        let ttl_expiry = instant_from_ttl(record.ttl);
        state.otps.insert(record.phone_hash.clone(), (record, ttl_expiry));
        Ok(())
    }

    async fn get(&self, phone_hash: &str) -> anyhow::Result<Option<OtpRecord>> {
        let state = self.inner.lock().expect("memory store mutex poisoned");
        Ok(state
            .otps
            .get(phone_hash)
            .filter(|(_, expiry)| is_live(*expiry))
            .map(|(record, _)| record.clone()))
    }

    async fn increment_attempts(&self, phone_hash: &str) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");
        if let Some((record, _)) = state.otps.get_mut(phone_hash) {
            record.attempt_count += 1;
        }
        Ok(())
    }

    async fn mark_verified(&self, phone_hash: &str) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");
        if let Some((record, _)) = state.otps.get_mut(phone_hash) {
            record.status = OtpStatus::Verified;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryAuthStore {
    async fn get_by_id(&self, user_id: &str) -> anyhow::Result<Option<UserRecord>> {
        let state = self.inner.lock().expect("memory store mutex poisoned");
        Ok(state.users.get(user_id).cloned())
    }

    async fn find_by_phone(&self, phone_number: &str) -> anyhow::Result<Option<UserRecord>> {
        let state = self.inner.lock().expect("memory store mutex poisoned");
        Ok(state
            .users_by_phone
            .get(phone_number)
            .and_then(|user_id| state.users.get(user_id))
            .cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryAuthStore {
    async fn create(&self, session: SessionRecord) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");
        let ttl_expiry = instant_from_ttl(session.ttl);
        state
            .sessions
            .insert(session.session_id.clone(), (session, ttl_expiry));
        Ok(())
    }

    async fn get_by_id(&self, session_id: &str) -> anyhow::Result<Option<SessionRecord>> {
        let state = self.inner.lock().expect("memory store mutex poisoned");
        Ok(state
            .sessions
            .get(session_id)
            .filter(|(_, expiry)| is_live(*expiry))
            .map(|(record, _)| record.clone()))
    }

    async fn list_by_user(&self, user_id: &str) -> anyhow::Result<Vec<SessionRecord>> {
        let state = self.inner.lock().expect("memory store mutex poisoned");
        Ok(state
            .sessions
            .values()
            .filter(|(_, expiry)| is_live(*expiry))
            .map(|(record, _)| record.clone())
            .filter(|record| record.user_id == user_id)
            .collect())
    }

    async fn update(
        &self,
        session_id: &str,
        expected_generation: i64,
        new_refresh_token_hash: String,
        new_prev_token_hash: Option<String>,
        new_expires_at: chrono::DateTime<Utc>,
        new_ttl: i64,
    ) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");
        let (record, expiry) = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| anyhow::Error::from(crate::error::DomainError::NotFound))?;
        if record.token_generation != expected_generation {
            return Err(anyhow::anyhow!(
                "conditional update failed: generation mismatch (expected {}, found {})",
                expected_generation,
                record.token_generation
            ));
        }
        record.prev_token_hash = new_prev_token_hash;
        record.refresh_token_hash = new_refresh_token_hash;
        record.token_generation += 1;
        record.expires_at = new_expires_at;
        record.ttl = new_ttl;
        *expiry = instant_from_ttl(new_ttl);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");
        state.sessions.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl AuthTransactor for MemoryAuthStore {
    async fn verify_otp_and_create_user(
        &self,
        phone_hash: &str,
        new_user_and_session: NewUserAndSession,
    ) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");

        if state
            .users_by_phone
            .contains_key(&new_user_and_session.phone_number)
        {
            return Err(anyhow::Error::from(crate::error::DomainError::AlreadyExists)
                .context("verify otp and create user: phone sentinel conflict"));
        }

        let now = Utc::now();
        let user = UserRecord {
            user_id: new_user_and_session.user_id.clone(),
            phone_number: new_user_and_session.phone_number.clone(),
            display_name: new_user_and_session.display_name.clone(),
            created_at: now,
            updated_at: now,
        };
        state
            .users_by_phone
            .insert(new_user_and_session.phone_number.clone(), user.user_id.clone());
        state.users.insert(user.user_id.clone(), user);

        let session_ttl = instant_from_ttl(new_user_and_session.session.ttl);
        state.sessions.insert(
            new_user_and_session.session.session_id.clone(),
            (new_user_and_session.session, session_ttl),
        );

        if let Some((record, _)) = state.otps.get_mut(phone_hash) {
            record.status = OtpStatus::Verified;
        }

        Ok(())
    }

    async fn verify_otp_and_create_session(
        &self,
        phone_hash: &str,
        session: SessionRecord,
    ) -> anyhow::Result<()> {
        let mut state = self.inner.lock().expect("memory store mutex poisoned");
        let session_ttl = instant_from_ttl(session.ttl);
        state
            .sessions
            .insert(session.session_id.clone(), (session, session_ttl));
        if let Some((record, _)) = state.otps.get_mut(phone_hash) {
            record.status = OtpStatus::Verified;
        }
        Ok(())
    }
}

/// Fixed-window rate limiter plus an independent lockout map, both backed by
/// the same wall-clock-TTL discipline as [`MemoryAuthStore`].
#[derive(Default)]
pub struct MemoryRateLimiter {
    windows: Mutex<HashMap<String, (u32, Instant)>>,
    lockouts: Mutex<HashMap<String, Instant>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check_and_increment(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> anyhow::Result<bool> {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        let entry = windows.get(key).copied();
        let (count, expiry) = match entry {
            Some((count, expiry)) if expiry > now => (count, expiry),
            _ => (0, now + window),
        };
        if count >= limit {
            windows.insert(key.to_string(), (count, expiry));
            return Ok(false);
        }
        windows.insert(key.to_string(), (count + 1, expiry));
        Ok(true)
    }

    async fn check_lockout(&self, key: &str) -> anyhow::Result<bool> {
        let lockouts = self.lockouts.lock().expect("rate limiter mutex poisoned");
        Ok(lockouts.get(key).is_some_and(|expiry| *expiry > Instant::now()))
    }

    async fn set_lockout(&self, key: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut lockouts = self.lockouts.lock().expect("rate limiter mutex poisoned");
        lockouts.insert(key.to_string(), Instant::now() + ttl);
        Ok(())
    }
}

/// Flat key/value revocation set, `jti -> expiry`.
#[derive(Default)]
pub struct MemoryRevocationStore {
    revoked: Mutex<HashMap<String, Instant>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, jti: &str) -> anyhow::Result<()> {
        let mut revoked = self.revoked.lock().expect("revocation store mutex poisoned");
        // TTL is bounded by the access-token lifetime elsewhere; a generous
        // fixed TTL here keeps the in-memory shim simple.
        revoked.insert(jti.to_string(), Instant::now() + Duration::from_secs(24 * 3600));
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> anyhow::Result<bool> {
        let revoked = self.revoked.lock().expect("revocation store mutex poisoned");
        Ok(revoked.get(jti).is_some_and(|expiry| *expiry > Instant::now()))
    }
}

/// Collects dispatched OTPs instead of sending anything - the local-dev /
/// test substitute for a real SMS vendor.
#[derive(Default)]
pub struct MemorySmsProvider {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemorySmsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("sms provider mutex poisoned").clone()
    }
}

#[async_trait]
impl SmsProvider for MemorySmsProvider {
    async fn send_otp(&self, phone_number: &str, code: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .expect("sms provider mutex poisoned")
            .push((phone_number.to_string(), code.to_string()));
        Ok(())
    }
}
