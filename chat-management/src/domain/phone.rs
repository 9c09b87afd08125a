//! E.164-canonical phone number value object.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A phone number already validated against the canonical international
/// format: `+` followed by a leading non-zero digit and 6 to 14 further
/// digits (7-15 digits total), no separators. Construction is the only
/// gate; once built, the value is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if !raw.starts_with('+') {
            return Err(DomainError::InvalidPhoneNumber);
        }
        let digits = &raw[1..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidPhoneNumber);
        }
        if digits.starts_with('0') {
            return Err(DomainError::InvalidPhoneNumber);
        }
        if digits.len() < 7 || digits.len() > 15 {
            return Err(DomainError::InvalidPhoneNumber);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits visible, the rest masked - for logs only.
    pub fn masked(&self) -> String {
        if self.0.len() <= 4 {
            return "****".to_string();
        }
        let visible = &self.0[self.0.len() - 4..];
        format!("****{}", visible)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_e164() {
        let p = PhoneNumber::parse("+15551234567").unwrap();
        assert_eq!(p.as_str(), "+15551234567");
        assert_eq!(p.to_string(), "+15551234567");
    }

    #[test]
    fn round_trips_for_all_valid_inputs() {
        for raw in ["+15551234567", "+442071838750", "+861012345678"] {
            let p = PhoneNumber::parse(raw).unwrap();
            assert_eq!(p.to_string(), raw);
        }
    }

    #[test]
    fn rejects_missing_plus() {
        assert!(matches!(
            PhoneNumber::parse("15551234567"),
            Err(DomainError::InvalidPhoneNumber)
        ));
    }

    #[test]
    fn rejects_leading_zero() {
        assert!(PhoneNumber::parse("+05551234567").is_err());
    }

    #[test]
    fn rejects_too_short_or_too_long() {
        assert!(PhoneNumber::parse("+123").is_err());
        assert!(PhoneNumber::parse("+1234567890123456").is_err());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(PhoneNumber::parse("+1555-123-4567").is_err());
    }

    #[test]
    fn masks_for_logging() {
        let p = PhoneNumber::parse("+15551234567").unwrap();
        assert_eq!(p.masked(), "****4567");
    }
}
