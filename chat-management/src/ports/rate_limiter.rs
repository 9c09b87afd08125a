use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Increments the fixed-window counter for `key` and reports whether
    /// the call stays within `limit` for the current `window`.
    async fn check_and_increment(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> anyhow::Result<bool>;

    async fn check_lockout(&self, key: &str) -> anyhow::Result<bool>;

    async fn set_lockout(&self, key: &str, ttl: Duration) -> anyhow::Result<()>;
}
