//! Strongly-typed identifiers, value objects, and normative limits shared
//! across the authentication and session core.

pub mod ids;
pub mod limits;
pub mod phone;
pub mod secret;

pub use ids::{ClientMessageId, DeviceId, Sequence, SessionId, UserId};
pub use limits::{Limits, Timeouts};
pub use phone::PhoneNumber;
pub use secret::{SecretBytes, SecretString};
