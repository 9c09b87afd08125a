//! Pluggable signing-key capability, generalizing the teacher's single-PEM
//! `JwtService` to simultaneous multi-key validity so rotation never needs
//! a flag day: a token signed under `kid_N` keeps verifying as long as
//! `kid_N`'s public key remains in the store.

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::collections::HashMap;
use std::sync::Arc;

/// Current signing key plus a lookup of every public key presently valid
/// for verification, keyed by key identifier.
pub trait KeyStore: Send + Sync {
    /// The key identifier and encoding key to sign a new token with.
    fn signing_key(&self) -> (&str, &EncodingKey);

    /// Look up a public key by key identifier for verification.
    fn decoding_key(&self, kid: &str) -> Option<&DecodingKey>;

    /// Every currently valid key identifier, for JWKS exposure.
    fn key_ids(&self) -> Vec<&str>;

    /// The raw RSA public key for a kid, for JWKS `n`/`e` exposure.
    fn public_key(&self, kid: &str) -> Option<&RsaPublicKey>;
}

struct KeyEntry {
    decoding_key: DecodingKey,
    public_key: RsaPublicKey,
}

/// In-process key store: one active signing key, plus a map of every key
/// (including retired ones still valid for verification) by kid.
pub struct StaticKeyStore {
    active_kid: String,
    signing_key: EncodingKey,
    keys: HashMap<String, KeyEntry>,
}

impl StaticKeyStore {
    /// Build a store with a single active signing key, from PKCS#1 PEM.
    pub fn single(kid: impl Into<String>, private_key_pem: &str) -> anyhow::Result<Self> {
        let kid = kid.into();
        let private_key = RsaPrivateKey::from_pkcs1_pem(private_key_pem)?;
        let public_key = RsaPublicKey::from(&private_key);

        let signing_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;
        let public_pem = rsa::pkcs1::EncodeRsaPublicKey::to_pkcs1_pem(
            &public_key,
            rsa::pkcs1::LineEnding::LF,
        )?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())?;

        let mut keys = HashMap::new();
        keys.insert(
            kid.clone(),
            KeyEntry {
                decoding_key,
                public_key,
            },
        );

        Ok(Self {
            active_kid: kid,
            signing_key,
            keys,
        })
    }

    /// Add a retired key that should still verify, without becoming the
    /// active signer - the rotation path.
    pub fn with_retired_key(
        mut self,
        kid: impl Into<String>,
        public_key_pem: &str,
    ) -> anyhow::Result<Self> {
        let public_key = RsaPublicKey::from_pkcs1_pem(public_key_pem)?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        self.keys.insert(
            kid.into(),
            KeyEntry {
                decoding_key,
                public_key,
            },
        );
        Ok(self)
    }
}

impl KeyStore for StaticKeyStore {
    fn signing_key(&self) -> (&str, &EncodingKey) {
        (&self.active_kid, &self.signing_key)
    }

    fn decoding_key(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid).map(|entry| &entry.decoding_key)
    }

    fn key_ids(&self) -> Vec<&str> {
        self.keys.keys().map(String::as_str).collect()
    }

    fn public_key(&self, kid: &str) -> Option<&RsaPublicKey> {
        self.keys.get(kid).map(|entry| &entry.public_key)
    }
}

/// Shared handle used throughout the service.
pub type SharedKeyStore = Arc<dyn KeyStore>;

/// JWKS exposure helper: `n`/`e` as base64url, per RFC 7517.
pub fn jwk_modulus_exponent(public_key: &RsaPublicKey) -> (String, String) {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());
    (n, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2048-bit RSA test key, PKCS#1 PEM. Generated for tests only.
    const TEST_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_rsa_key.pem");

    #[test]
    fn single_key_round_trips_signing_and_decoding() {
        let store = StaticKeyStore::single("kid-1", TEST_PRIVATE_KEY).unwrap();
        let (kid, _enc) = store.signing_key();
        assert_eq!(kid, "kid-1");
        assert!(store.decoding_key("kid-1").is_some());
        assert!(store.decoding_key("missing").is_none());
    }
}
