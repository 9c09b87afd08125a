use crate::models::SessionRecord;
use async_trait::async_trait;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: SessionRecord) -> anyhow::Result<()>;

    async fn get_by_id(&self, session_id: &str) -> anyhow::Result<Option<SessionRecord>>;

    async fn list_by_user(&self, user_id: &str) -> anyhow::Result<Vec<SessionRecord>>;

    /// Conditional update: the implementation must reject the write if the
    /// stored `token_generation` no longer matches `expected_generation`,
    /// surfacing the conflict as a wrapped infrastructure error so a racing
    /// refresh cannot silently clobber a concurrent rotation.
    async fn update(
        &self,
        session_id: &str,
        expected_generation: i64,
        new_refresh_token_hash: String,
        new_prev_token_hash: Option<String>,
        new_expires_at: chrono::DateTime<chrono::Utc>,
        new_ttl: i64,
    ) -> anyhow::Result<()>;

    async fn delete(&self, session_id: &str) -> anyhow::Result<()>;
}
