//! The authentication and session core: phone+OTP bootstrap, session
//! lifecycle, access-token minting, refresh rotation with reuse detection,
//! and logout. Generalizes the teacher's `services::{jwt,database}`-backed
//! handlers into a single application service over the injected ports in
//! [`crate::ports`], the way `auth-service`'s handlers previously called
//! `state.jwt`/`state.db` directly but now call through one seam.

use crate::clock::Clock;
use crate::crypto::{otp, refresh_token};
use crate::domain::{DeviceId, Limits, PhoneNumber, SecretBytes, SessionId, UserId};
use crate::error::{DomainError, WrapError};
use crate::models::{OtpRecord, OtpStatus, SessionRecord, UserRecord};
use crate::ports::{
    AuthTransactor, NewUserAndSession, OtpStore, RateLimiter, RevocationStore, SessionStore,
    SmsProvider, UserStore,
};
use crate::services::metrics::Metrics;
use crate::token::minter::Minter;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::task::TaskTracker;

pub struct RequestOtpOutput {
    pub expires_at: DateTime<Utc>,
    pub retry_after_seconds: i64,
}

pub struct VerifyOtpOutput {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub access_token: String,
    pub refresh_token: String,
    pub is_new_user: bool,
    pub access_token_expiry: DateTime<Utc>,
}

pub struct RefreshTokensOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expiry: DateTime<Utc>,
}

/// Every dependency `AuthService` needs, gathered so wiring code builds the
/// service in one call instead of threading ten constructor arguments.
pub struct AuthServiceDeps {
    pub otp_store: Arc<dyn OtpStore>,
    pub user_store: Arc<dyn UserStore>,
    pub session_store: Arc<dyn SessionStore>,
    pub transactor: Arc<dyn AuthTransactor>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub revocation: Arc<dyn RevocationStore>,
    pub sms: Arc<dyn SmsProvider>,
    pub clock: Arc<dyn Clock>,
    pub minter: Arc<Minter>,
    pub pepper: SecretBytes,
    pub limits: Limits,
    pub metrics: Arc<Metrics>,
}

pub struct AuthService {
    otp_store: Arc<dyn OtpStore>,
    user_store: Arc<dyn UserStore>,
    session_store: Arc<dyn SessionStore>,
    transactor: Arc<dyn AuthTransactor>,
    rate_limiter: Arc<dyn RateLimiter>,
    revocation: Arc<dyn RevocationStore>,
    sms: Arc<dyn SmsProvider>,
    clock: Arc<dyn Clock>,
    minter: Arc<Minter>,
    pepper: SecretBytes,
    limits: Limits,
    metrics: Arc<Metrics>,
    dispatch_tracker: TaskTracker,
}

impl AuthService {
    pub fn new(deps: AuthServiceDeps) -> Self {
        Self {
            otp_store: deps.otp_store,
            user_store: deps.user_store,
            session_store: deps.session_store,
            transactor: deps.transactor,
            rate_limiter: deps.rate_limiter,
            revocation: deps.revocation,
            sms: deps.sms,
            clock: deps.clock,
            minter: deps.minter,
            pepper: deps.pepper,
            limits: deps.limits,
            metrics: deps.metrics,
            dispatch_tracker: TaskTracker::new(),
        }
    }

    /// Blocks until every detached SMS dispatch spawned by `request_otp` has
    /// completed. Wiring code calls this during graceful shutdown, before
    /// closing the listeners.
    pub async fn wait_for_background_dispatches(&self) {
        self.dispatch_tracker.close();
        self.dispatch_tracker.wait().await;
    }

    fn unavailable(&self, context: &'static str, cause: anyhow::Error) -> anyhow::Error {
        tracing::warn!(error = %cause, context, "dependency failed, fail-closed as unavailable");
        anyhow::Error::from(DomainError::Unavailable).context(context)
    }

    #[tracing::instrument(name = "auth.request_otp", skip(self), fields(phone = tracing::field::Empty))]
    pub async fn request_otp(
        &self,
        phone_raw: &str,
        client_ip: &str,
    ) -> anyhow::Result<RequestOtpOutput> {
        let phone = PhoneNumber::parse(phone_raw).wrap("parse phone number")?;
        tracing::Span::current().record("phone", phone.masked().as_str());
        let phone_hash = otp::hash_phone(&phone);

        let phone_key = format!("otp_req:phone:{}", phone_hash);
        match self
            .rate_limiter
            .check_and_increment(
                &phone_key,
                self.limits.otp_request_limit_per_phone,
                self.limits.otp_request_window_per_phone,
            )
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                self.metrics.record_rate_limit_hit("phone");
                self.metrics.record_outcome("request_otp", "phone_rate_limited");
                return Err(anyhow::Error::from(DomainError::PhoneRateLimited));
            }
            Err(e) => return Err(self.unavailable("phone rate limit check", e)),
        }

        let ip_key = format!("otp_req:ip:{}", client_ip);
        match self
            .rate_limiter
            .check_and_increment(
                &ip_key,
                self.limits.otp_request_limit_per_ip,
                self.limits.otp_request_window_per_ip,
            )
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                self.metrics.record_rate_limit_hit("ip");
                self.metrics.record_outcome("request_otp", "ip_rate_limited");
                return Err(anyhow::Error::from(DomainError::IPRateLimited));
            }
            Err(e) => {
                tracing::warn!(error = %e, "ip rate limiter infrastructure error, failing open");
            }
        }

        let code = otp::generate_code();
        let now = self.clock.now();
        let expires_at = now
            + chrono::Duration::from_std(self.limits.otp_validity).unwrap_or(chrono::Duration::zero());
        let mac = otp::mac(&self.pepper, &code, &phone_hash, expires_at.timestamp());

        let record = OtpRecord {
            phone_hash: phone_hash.clone(),
            otp_mac: mac,
            status: OtpStatus::Pending,
            attempt_count: 0,
            created_at: now,
            expires_at,
            ttl: expires_at.timestamp(),
        };

        match self.otp_store.create(record).await {
            Ok(()) => {}
            Err(e) => {
                if DomainError::from_anyhow(&e) == Some(DomainError::AlreadyExists) {
                    let existing = self
                        .otp_store
                        .get(&phone_hash)
                        .await
                        .context("load existing otp record")?
                        .ok_or_else(|| anyhow::Error::from(DomainError::InvalidOTP))?;
                    self.metrics.record_outcome("request_otp", "idempotent_replay");
                    return Ok(RequestOtpOutput {
                        expires_at: existing.expires_at,
                        retry_after_seconds: 60,
                    });
                }
                return Err(e.context("create otp record"));
            }
        }

        let sms = self.sms.clone();
        let phone_for_task = phone.as_str().to_string();
        let code_for_task = code;
        self.dispatch_tracker.spawn(async move {
            if let Err(e) = sms.send_otp(&phone_for_task, &code_for_task).await {
                tracing::error!(error = %e, "sms dispatch failed");
            }
        });

        self.metrics.record_outcome("request_otp", "ok");
        Ok(RequestOtpOutput {
            expires_at,
            retry_after_seconds: 60,
        })
    }

    #[tracing::instrument(name = "auth.verify_otp", skip(self, code), fields(phone = tracing::field::Empty))]
    pub async fn verify_otp(
        &self,
        phone_raw: &str,
        code: &str,
        device_id_raw: &str,
    ) -> anyhow::Result<VerifyOtpOutput> {
        let phone = PhoneNumber::parse(phone_raw).wrap("parse phone number")?;
        tracing::Span::current().record("phone", phone.masked().as_str());
        if device_id_raw.is_empty() {
            return Err(anyhow::Error::from(DomainError::InvalidInput).context("device id required"));
        }
        let device_id = DeviceId::new(device_id_raw);
        let phone_hash = otp::hash_phone(&phone);

        let verify_key = format!("otp_verify:phone:{}", phone_hash);
        match self
            .rate_limiter
            .check_and_increment(&verify_key, self.limits.otp_verify_limit, self.limits.otp_verify_window)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                self.metrics.record_rate_limit_hit("verify");
                self.metrics.record_outcome("verify_otp", "rate_limited");
                return Err(anyhow::Error::from(DomainError::RateLimited));
            }
            Err(e) => return Err(self.unavailable("otp verify rate limit check", e)),
        }

        let lockout_key = format!("otp_lockout:phone:{}", phone_hash);
        match self.rate_limiter.check_lockout(&lockout_key).await {
            Ok(false) => {}
            Ok(true) => {
                self.metrics.record_rate_limit_hit("lockout");
                self.metrics.record_outcome("verify_otp", "locked_out");
                return Err(anyhow::Error::from(DomainError::RateLimited));
            }
            Err(e) => return Err(self.unavailable("otp lockout check", e)),
        }

        let record = self
            .otp_store
            .get(&phone_hash)
            .await
            .context("load otp record")?
            .ok_or_else(|| anyhow::Error::from(DomainError::InvalidOTP))?;

        if record.status == OtpStatus::Verified {
            return Err(anyhow::Error::from(DomainError::InvalidOTP));
        }

        if record.attempt_count >= self.limits.max_otp_verify_attempts as i64 {
            if let Err(e) = self.rate_limiter.set_lockout(&lockout_key, self.limits.lockout_ttl).await {
                tracing::warn!(error = %e, "failed to set otp lockout");
            }
            self.metrics.record_outcome("verify_otp", "max_attempts_exceeded");
            return Err(anyhow::Error::from(DomainError::RateLimited));
        }

        let now = self.clock.now();
        if now > record.expires_at {
            return Err(anyhow::Error::from(DomainError::InvalidOTP));
        }

        let candidate_mac = otp::mac(&self.pepper, code, &phone_hash, record.expires_at.timestamp());
        if !otp::verify_mac(&record.otp_mac, &candidate_mac) {
            if let Err(e) = self.otp_store.increment_attempts(&phone_hash).await {
                tracing::warn!(error = %e, "failed to record otp attempt");
            }
            self.metrics.record_outcome("verify_otp", "invalid_code");
            return Err(anyhow::Error::from(DomainError::InvalidOTP));
        }

        let existing_user = self
            .user_store
            .find_by_phone(phone.as_str())
            .await
            .context("find user by phone")?;

        let (user_id, session_id, issued, is_new_user) = match existing_user {
            None => self.register_new_user(&phone, &device_id, &phone_hash, now).await?,
            Some(user) => {
                let (session_id, issued) = self
                    .login_existing_user(&user, &device_id, &phone_hash, now)
                    .await?;
                (UserId::from_string(user.user_id), session_id, issued, false)
            }
        };

        let minted = self.minter.mint(&user_id, &session_id).context("mint access token")?;
        self.metrics.record_outcome("verify_otp", "ok");

        Ok(VerifyOtpOutput {
            user_id,
            session_id,
            access_token: minted.token,
            refresh_token: issued.token,
            is_new_user,
            access_token_expiry: crate::clock::from_millis(minted.expires_at_unix * 1000),
        })
    }

    async fn register_new_user(
        &self,
        phone: &PhoneNumber,
        device_id: &DeviceId,
        phone_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(UserId, SessionId, refresh_token::IssuedToken, bool)> {
        let user_id = UserId::generate();
        let session_id = SessionId::generate();
        let issued = refresh_token::issue();
        let expires_at = now
            + chrono::Duration::from_std(self.limits.refresh_token_lifetime)
                .unwrap_or(chrono::Duration::zero());

        let session = SessionRecord {
            session_id: session_id.as_str().to_string(),
            user_id: user_id.as_str().to_string(),
            device_id: device_id.as_str().to_string(),
            refresh_token_hash: issued.token_hash.clone(),
            prev_token_hash: None,
            created_at: now,
            expires_at,
            token_generation: 0,
            ttl: expires_at.timestamp(),
        };

        let new_user_and_session = NewUserAndSession {
            user_id: user_id.as_str().to_string(),
            phone_number: phone.as_str().to_string(),
            display_name: String::new(),
            session,
        };

        match self
            .transactor
            .verify_otp_and_create_user(phone_hash, new_user_and_session)
            .await
        {
            Ok(()) => Ok((user_id, session_id, issued, true)),
            Err(e) if DomainError::from_anyhow(&e) == Some(DomainError::AlreadyExists) => {
                tracing::info!("registration race lost to a concurrent registration, falling back to login");
                let user = self
                    .user_store
                    .find_by_phone(phone.as_str())
                    .await
                    .context("re-resolve user after registration race")?
                    .ok_or_else(|| {
                        anyhow::Error::from(DomainError::Unavailable)
                            .context("user vanished after registration race")
                    })?;
                let (session_id, issued) = self
                    .login_existing_user(&user, device_id, phone_hash, now)
                    .await?;
                Ok((UserId::from_string(user.user_id), session_id, issued, false))
            }
            Err(e) => Err(e.context("verify otp and create user")),
        }
    }

    async fn login_existing_user(
        &self,
        user: &UserRecord,
        device_id: &DeviceId,
        phone_hash: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<(SessionId, refresh_token::IssuedToken)> {
        let sessions = self
            .session_store
            .list_by_user(&user.user_id)
            .await
            .context("list sessions for user")?;

        let mut remaining = Vec::new();
        for session in sessions {
            if session.device_id == device_id.as_str() {
                self.session_store
                    .delete(&session.session_id)
                    .await
                    .context("evict device-conflicting session")?;
                self.revocation
                    .revoke(&session.session_id)
                    .await
                    .context("revoke device-conflicting session")?;
            } else {
                remaining.push(session);
            }
        }

        if remaining.len() >= self.limits.max_sessions_per_user {
            remaining.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.session_id.cmp(&b.session_id))
            });
            let to_evict = remaining.len() + 1 - self.limits.max_sessions_per_user;
            for session in remaining.iter().take(to_evict) {
                self.session_store
                    .delete(&session.session_id)
                    .await
                    .context("evict oldest session over cap")?;
                self.revocation
                    .revoke(&session.session_id)
                    .await
                    .context("revoke session evicted over cap")?;
            }
        }

        let session_id = SessionId::generate();
        let issued = refresh_token::issue();
        let expires_at = now
            + chrono::Duration::from_std(self.limits.refresh_token_lifetime)
                .unwrap_or(chrono::Duration::zero());

        let session = SessionRecord {
            session_id: session_id.as_str().to_string(),
            user_id: user.user_id.clone(),
            device_id: device_id.as_str().to_string(),
            refresh_token_hash: issued.token_hash.clone(),
            prev_token_hash: None,
            created_at: now,
            expires_at,
            token_generation: 0,
            ttl: expires_at.timestamp(),
        };

        self.transactor
            .verify_otp_and_create_session(phone_hash, session)
            .await
            .context("verify otp and create session")?;

        Ok((session_id, issued))
    }

    #[tracing::instrument(name = "auth.refresh_tokens", skip(self, access_token, refresh_token))]
    pub async fn refresh_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
        device_id_raw: &str,
    ) -> anyhow::Result<RefreshTokensOutput> {
        let claims = self
            .minter
            .validate_waiving_expiry(access_token)
            .wrap("validate access token")?;

        let session = self
            .session_store
            .get_by_id(&claims.sid)
            .await
            .context("load session")?;
        let session = match session {
            Some(session) => session,
            None => return Err(anyhow::Error::from(DomainError::SessionRevoked)),
        };

        if session.device_id != device_id_raw {
            return Err(anyhow::Error::from(DomainError::DeviceMismatch));
        }

        let now = self.clock.now();
        if now > session.expires_at {
            return Err(anyhow::Error::from(DomainError::SessionExpired));
        }

        let presented_hash = crate::crypto::refresh_token::hash(refresh_token);

        if presented_hash == session.refresh_token_hash {
            let issued = crate::crypto::refresh_token::issue();
            let new_expires_at = now
                + chrono::Duration::from_std(self.limits.refresh_token_lifetime)
                    .unwrap_or(chrono::Duration::zero());

            self.session_store
                .update(
                    &session.session_id,
                    session.token_generation,
                    issued.token_hash.clone(),
                    Some(session.refresh_token_hash.clone()),
                    new_expires_at,
                    new_expires_at.timestamp(),
                )
                .await
                .context("rotate session refresh token")?;

            let user_id = UserId::from_string(claims.sub.clone());
            let session_id = SessionId::from_string(session.session_id.clone());
            let minted = self.minter.mint(&user_id, &session_id).context("mint access token")?;

            self.metrics.record_outcome("refresh_tokens", "rotated");
            return Ok(RefreshTokensOutput {
                access_token: minted.token,
                refresh_token: issued.token,
                access_token_expiry: crate::clock::from_millis(minted.expires_at_unix * 1000),
            });
        }

        if let Some(prev) = session.prev_token_hash.as_deref() {
            if !prev.is_empty() && prev == presented_hash {
                if let Err(e) = self.session_store.delete(&session.session_id).await {
                    tracing::error!(error = %e, "failed to delete session on refresh token reuse");
                }
                if let Err(e) = self.revocation.revoke(&claims.jti).await {
                    tracing::error!(error = %e, "failed to revoke access token on refresh token reuse");
                }
                self.metrics.record_outcome("refresh_tokens", "reuse_detected");
                return Err(anyhow::Error::from(DomainError::RefreshTokenReuse));
            }
        }

        self.metrics.record_outcome("refresh_tokens", "invalid_token");
        Err(anyhow::Error::from(DomainError::InvalidRefreshToken))
    }

    #[tracing::instrument(name = "auth.logout", skip(self, access_token))]
    pub async fn logout(&self, access_token: &str) -> anyhow::Result<()> {
        let claims = self.minter.validate(access_token).wrap("validate access token")?;

        if let Err(e) = self.session_store.delete(&claims.sid).await {
            tracing::warn!(error = %e, "failed to delete session during logout");
        }

        self.revocation
            .revoke(&claims.jti)
            .await
            .context("revoke access token on logout")?;

        self.metrics.record_outcome("logout", "ok");
        Ok(())
    }
}
