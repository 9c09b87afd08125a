use crate::models::SessionRecord;
use async_trait::async_trait;

pub struct NewUserAndSession {
    pub user_id: String,
    pub phone_number: String,
    pub display_name: String,
    pub session: SessionRecord,
}

/// Collapses several conditional writes into one multi-row atomic
/// operation, as the teacher's Postgres transaction-per-aggregate idiom
/// does elsewhere: a single `pool.begin()` transaction per call.
#[async_trait]
pub trait AuthTransactor: Send + Sync {
    /// Consume the OTP, create the user, create the phone-uniqueness
    /// sentinel, and create the first session - all-or-nothing. Surfaces
    /// `DomainError::AlreadyExists` distinctly when the phone sentinel
    /// conflicts with a concurrent registration.
    async fn verify_otp_and_create_user(
        &self,
        phone_hash: &str,
        new_user_and_session: NewUserAndSession,
    ) -> anyhow::Result<()>;

    /// Consume the OTP and create a session for an existing user,
    /// all-or-nothing.
    async fn verify_otp_and_create_session(
        &self,
        phone_hash: &str,
        session: SessionRecord,
    ) -> anyhow::Result<()>;
}
