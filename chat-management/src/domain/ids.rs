//! Opaque identifiers. All but `ClientMessageId` are server-generated,
//! version-4 random lexical forms; the zero value (`Default`, an empty
//! string) is never produced by `generate` and is therefore always
//! distinguishable from any real identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

uuid_id!(UserId);
uuid_id!(SessionId);

/// Device identifiers are presented by the client, not server-generated,
/// but follow the same opaque-string treatment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-chosen message identifier, used for delivery idempotency by the
/// (out-of-scope) dataplane. Non-empty, length-bounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientMessageId(String);

pub const MAX_CLIENT_MESSAGE_ID_LEN: usize = 128;

impl ClientMessageId {
    pub fn parse(raw: &str) -> Result<Self, crate::error::DomainError> {
        if raw.is_empty() || raw.len() > MAX_CLIENT_MESSAGE_ID_LEN {
            return Err(crate::error::DomainError::InvalidId);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Monotonic per-chat message counter. Only consumed here as the message-ack
/// payload the token/session core hands back to the dataplane.
pub type Sequence = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_never_zero() {
        assert!(!UserId::generate().is_zero());
        assert!(!SessionId::generate().is_zero());
    }

    #[test]
    fn default_id_is_zero() {
        assert!(UserId::default().is_zero());
    }

    #[test]
    fn client_message_id_rejects_empty_and_oversized() {
        assert!(ClientMessageId::parse("").is_err());
        let oversized = "a".repeat(MAX_CLIENT_MESSAGE_ID_LEN + 1);
        assert!(ClientMessageId::parse(&oversized).is_err());
        assert!(ClientMessageId::parse("ok").is_ok());
    }
}
