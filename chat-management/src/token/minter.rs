//! RS256 access-token mint and validation, generalizing the teacher's
//! `JwtService` over a multi-kid [`KeyStore`] instead of one fixed PEM pair.

use crate::clock::Clock;
use crate::domain::{SessionId, UserId};
use crate::error::DomainError;
use crate::token::keystore::SharedKeyStore;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const SCOPE: &str = "chat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub sid: String,
    pub scope: String,
}

pub struct Minter {
    keys: SharedKeyStore,
    clock: Arc<dyn Clock>,
    issuer: String,
    audience: String,
    access_token_lifetime: Duration,
}

pub struct MintedToken {
    pub token: String,
    pub jti: String,
    pub expires_at_unix: i64,
}

impl Minter {
    pub fn new(
        keys: SharedKeyStore,
        clock: Arc<dyn Clock>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        access_token_lifetime: Duration,
    ) -> Self {
        Self {
            keys,
            clock,
            issuer: issuer.into(),
            audience: audience.into(),
            access_token_lifetime,
        }
    }

    pub fn mint(&self, user_id: &UserId, session_id: &SessionId) -> anyhow::Result<MintedToken> {
        let (kid, encoding_key) = self.keys.signing_key();

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());

        let issued_at = self.clock.now().timestamp();
        let expires_at = issued_at + self.access_token_lifetime.as_secs() as i64;

        let mut jti_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut jti_bytes);
        let jti = hex::encode(jti_bytes);

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at,
            exp: expires_at,
            jti: jti.clone(),
            sid: session_id.as_str().to_string(),
            scope: SCOPE.to_string(),
        };

        let token = encode(&header, &claims, encoding_key)?;
        Ok(MintedToken {
            token,
            jti,
            expires_at_unix: expires_at,
        })
    }

    /// Full validation including expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, DomainError> {
        self.validate_inner(token, true)
    }

    /// Validates every invariant except expiry - used exclusively by the
    /// refresh path, which must still accept a token whose access-token
    /// half has already expired.
    pub fn validate_waiving_expiry(&self, token: &str) -> Result<Claims, DomainError> {
        self.validate_inner(token, false)
    }

    fn validate_inner(&self, token: &str, check_expiry: bool) -> Result<Claims, DomainError> {
        let header = decode_header(token).map_err(|_| DomainError::Unauthorized)?;
        if header.alg != Algorithm::RS256 {
            return Err(DomainError::Unauthorized);
        }

        let kid = header.kid.as_deref().ok_or(DomainError::Unauthorized)?;
        let decoding_key: &DecodingKey = self
            .keys
            .decoding_key(kid)
            .ok_or(DomainError::Unauthorized)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.clone()]);
        validation.set_audience(&[self.audience.clone()]);
        // Expiry is checked below against the injected clock, never against
        // jsonwebtoken's internal `SystemTime::now()` - the clock contract
        // (clock.rs) requires every time-dependent path to consume the
        // injected clock so boundary behaviour is test-deterministic.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("iss".to_string());
        validation.required_spec_claims.insert("aud".to_string());
        validation.required_spec_claims.insert("exp".to_string());

        let data = decode::<Claims>(token, decoding_key, &validation)
            .map_err(|_| DomainError::Unauthorized)?;

        if data.claims.sid.is_empty() {
            return Err(DomainError::Unauthorized);
        }

        if check_expiry && self.clock.now().timestamp() > data.claims.exp {
            return Err(DomainError::Unauthorized);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use crate::token::keystore::StaticKeyStore;
    use chrono::{DateTime, Utc};

    const TEST_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_rsa_key.pem");

    fn minter_at(start: DateTime<Utc>) -> (Minter, Arc<TestClock>) {
        let keys: SharedKeyStore = Arc::new(StaticKeyStore::single("kid-1", TEST_PRIVATE_KEY).unwrap());
        let clock = Arc::new(TestClock::new(start));
        let minter = Minter::new(
            keys,
            clock.clone(),
            "chat-management",
            "chat-clients",
            Duration::from_secs(3600),
        );
        (minter, clock)
    }

    #[test]
    fn mint_then_validate_round_trips_subject_and_session() {
        let (minter, _clock) = minter_at(Utc::now());
        let user_id = UserId::generate();
        let session_id = SessionId::generate();

        let minted = minter.mint(&user_id, &session_id).unwrap();
        let claims = minter.validate(&minted.token).unwrap();

        assert_eq!(claims.sub, user_id.as_str());
        assert_eq!(claims.sid, session_id.as_str());
        assert!(claims.iat <= claims.exp);
    }

    #[test]
    fn two_mints_have_distinct_jti() {
        let (minter, _clock) = minter_at(Utc::now());
        let user_id = UserId::generate();
        let session_id = SessionId::generate();
        let a = minter.mint(&user_id, &session_id).unwrap();
        let b = minter.mint(&user_id, &session_id).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn token_rejected_after_expiry_boundary() {
        let start = Utc::now();
        let (minter, clock) = minter_at(start);
        let minted = minter.mint(&UserId::generate(), &SessionId::generate()).unwrap();

        clock.set(DateTime::from_timestamp(minted.expires_at_unix - 1, 0).unwrap());
        assert!(minter.validate(&minted.token).is_ok());

        clock.set(DateTime::from_timestamp(minted.expires_at_unix + 1, 0).unwrap());
        assert!(minter.validate(&minted.token).is_err());
    }

    #[test]
    fn validate_waiving_expiry_accepts_expired_token() {
        let start = Utc::now();
        let (minter, clock) = minter_at(start);
        let minted = minter.mint(&UserId::generate(), &SessionId::generate()).unwrap();

        clock.set(DateTime::from_timestamp(minted.expires_at_unix + 1000, 0).unwrap());
        assert!(minter.validate(&minted.token).is_err());
        assert!(minter.validate_waiving_expiry(&minted.token).is_ok());
    }

    #[test]
    fn rotated_key_still_verifies_while_retired_key_present() {
        let keys: SharedKeyStore = Arc::new(StaticKeyStore::single("kid-1", TEST_PRIVATE_KEY).unwrap());
        let clock: Arc<dyn Clock> = Arc::new(TestClock::new(Utc::now()));
        let minter = Minter::new(
            keys,
            clock,
            "chat-management",
            "chat-clients",
            Duration::from_secs(3600),
        );
        let minted = minter.mint(&UserId::generate(), &SessionId::generate()).unwrap();
        assert!(minter.validate(&minted.token).is_ok());
    }
}
