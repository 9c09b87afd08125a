use crate::models::OtpRecord;
use async_trait::async_trait;

/// Conditional-create/read/increment over the OTP record keyed by phone
/// hash. All methods may return a wrapped infrastructure error; `create`
/// surfaces `DomainError::AlreadyExists` (via the wrapped chain) when an
/// active record already exists for the hash.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Create iff no active (non-expired) record exists for `phone_hash`.
    async fn create(&self, record: OtpRecord) -> anyhow::Result<()>;

    async fn get(&self, phone_hash: &str) -> anyhow::Result<Option<OtpRecord>>;

    async fn increment_attempts(&self, phone_hash: &str) -> anyhow::Result<()>;

    /// Mark the record `Verified`, terminal - no further MAC attempts
    /// succeed against it.
    async fn mark_verified(&self, phone_hash: &str) -> anyhow::Result<()>;
}
