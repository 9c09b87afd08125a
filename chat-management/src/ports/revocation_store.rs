use async_trait::async_trait;

#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, jti: &str) -> anyhow::Result<()>;

    async fn is_revoked(&self, jti: &str) -> anyhow::Result<bool>;
}
