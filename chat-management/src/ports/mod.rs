//! Persistence and infrastructure capability interfaces. `AuthService`
//! depends only on these traits, never on a concrete adapter, so tests can
//! substitute the in-memory implementations under `crate::adapters::memory`.

pub mod otp_store;
pub mod rate_limiter;
pub mod revocation_store;
pub mod session_store;
pub mod sms_provider;
pub mod transactor;
pub mod user_store;

pub use otp_store::OtpStore;
pub use rate_limiter::RateLimiter;
pub use revocation_store::RevocationStore;
pub use session_store::SessionStore;
pub use sms_provider::SmsProvider;
pub use transactor::{AuthTransactor, NewUserAndSession};
pub use user_store::UserStore;
