//! Credential-bearing wrappers that never leak through logging or
//! structured-log formatting. Built on `secrecy`'s zeroizing storage, with
//! `Display`/`Debug` overridden to the literal `[REDACTED]` rather than
//! secrecy's default `Secret<T>` placeholder, since the spec mandates that
//! exact literal.

use secrecy::{ExposeSecret, SecretBox, SecretString as InnerSecretString};
use std::fmt;

/// Wraps a `String` that must never appear in logs or error messages.
#[derive(Clone)]
pub struct SecretString(InnerSecretString);

impl SecretString {
    pub fn new(value: String) -> Self {
        Self(InnerSecretString::from(value))
    }

    /// Explicit escape hatch - the only way to read the underlying bytes.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Wraps raw bytes that must never appear in logs - peppers, private key
/// material, raw refresh tokens in flight.
#[derive(Clone)]
pub struct SecretBytes(std::sync::Arc<SecretBox<[u8]>>);

impl SecretBytes {
    pub fn new(value: Vec<u8>) -> Self {
        Self(std::sync::Arc::new(SecretBox::new(value.into_boxed_slice())))
    }

    pub fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl fmt::Display for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_string_redacts_display_and_debug() {
        let s = SecretString::new("super-secret-pepper".to_string());
        assert_eq!(format!("{}", s), "[REDACTED]");
        assert_eq!(format!("{:?}", s), "[REDACTED]");
        assert_eq!(s.expose(), "super-secret-pepper");
    }

    #[test]
    fn secret_bytes_redacts_display_and_debug() {
        let s = SecretBytes::new(vec![1, 2, 3, 4]);
        assert_eq!(format!("{}", s), "[REDACTED]");
        assert_eq!(format!("{:?}", s), "[REDACTED]");
        assert_eq!(s.expose(), &[1, 2, 3, 4]);
    }
}
