//! Opaque refresh token material. The token handed to the client is random
//! bytes, base64url-encoded; only its SHA-256 hash is ever persisted, so a
//! leaked database row cannot be replayed as a token.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// A freshly minted opaque refresh token plus the hash to persist for it.
pub struct IssuedToken {
    pub token: String,
    pub token_hash: String,
}

pub fn issue() -> IssuedToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);
    let token_hash = hash(&token);
    IssuedToken { token, token_hash }
}

pub fn hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_are_unique_and_well_formed() {
        let a = issue();
        let b = issue();
        assert_ne!(a.token, b.token);
        assert_eq!(a.token.len(), 43); // 32 bytes base64url-no-pad
        assert_eq!(a.token_hash, hash(&a.token));
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash("same-token"), hash("same-token"));
        assert_ne!(hash("token-a"), hash("token-b"));
    }
}
