//! OTP code generation and verification. The verification code itself is
//! never persisted; only an HMAC-SHA256 MAC over code + phone hash + expiry
//! is stored, checked in constant time.

use crate::domain::{PhoneNumber, SecretBytes};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const OTP_LENGTH: usize = 6;

/// Generate a zero-padded numeric OTP using the OS cryptographic source.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let value: u32 = rng.gen_range(0..10_u32.pow(OTP_LENGTH as u32));
    format!("{:0width$}", value, width = OTP_LENGTH)
}

/// SHA-256 of the phone number, hex-encoded. Used as a pseudonymous key so
/// stores never hold a plaintext phone number outside `users`.
pub fn hash_phone(phone: &PhoneNumber) -> String {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(phone.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over `code || phone_hash || expires_at` keyed by a
/// server-side secret, hex-encoded.
pub fn mac(secret: &SecretBytes, code: &str, phone_hash: &str, expires_at_unix: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.expose()).expect("hmac accepts any key length");
    mac.update(code.as_bytes());
    mac.update(phone_hash.as_bytes());
    mac.update(expires_at_unix.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison between a freshly computed MAC and the stored
/// one, to avoid timing side channels on OTP guesses.
pub fn verify_mac(expected_hex: &str, candidate_hex: &str) -> bool {
    let expected = match hex::decode(expected_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let candidate = match hex::decode(candidate_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if expected.len() != candidate.len() {
        return false;
    }
    expected.ct_eq(&candidate).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_right_length_and_numeric() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn mac_round_trips_and_rejects_tamper() {
        let secret = SecretBytes::new(vec![7u8; 32]);
        let phone = PhoneNumber::parse("+14155551234").unwrap();
        let phone_hash = hash_phone(&phone);
        let expires = 1_700_000_000_i64;

        let code = "123456";
        let computed = mac(&secret, code, &phone_hash, expires);
        assert!(verify_mac(&computed, &mac(&secret, code, &phone_hash, expires)));
        assert!(!verify_mac(&computed, &mac(&secret, "654321", &phone_hash, expires)));
        assert!(!verify_mac(&computed, &mac(&secret, code, &phone_hash, expires + 1)));
    }

    #[test]
    fn phone_hash_is_stable_and_deterministic() {
        let phone = PhoneNumber::parse("+14155551234").unwrap();
        assert_eq!(hash_phone(&phone), hash_phone(&phone));
    }
}
