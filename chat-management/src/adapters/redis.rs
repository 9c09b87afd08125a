//! Redis-backed `RateLimiter` and `RevocationStore`, grounded on the
//! teacher's `services::redis::RedisService` (`ConnectionManager` plus raw
//! `redis::cmd` calls rather than typed commands, same reconnect-on-drop
//! behavior).

use crate::ports::{RateLimiter, RevocationStore};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use std::time::Duration;

#[derive(Clone)]
pub struct RedisStore {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        tracing::info!(%url, "connecting to redis");
        let client = Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        tracing::info!("successfully connected to redis");
        Ok(Self {
            _client: client,
            manager,
        })
    }

    pub async fn health_check(&self) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("redis health check failed: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl RateLimiter for RedisStore {
    async fn check_and_increment(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> anyhow::Result<bool> {
        let mut conn = self.manager.clone();
        let redis_key = format!("ratelimit:{}", key);

        let count: u64 = redis::cmd("INCR")
            .arg(&redis_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("rate limit incr failed: {}", e))?;

        if count == 1 {
            redis::cmd("EXPIRE")
                .arg(&redis_key)
                .arg(window.as_secs())
                .query_async::<_, ()>(&mut conn)
                .await
                .map_err(|e| anyhow::anyhow!("rate limit expire failed: {}", e))?;
        }

        Ok(count <= limit as u64)
    }

    async fn check_lockout(&self, key: &str) -> anyhow::Result<bool> {
        let mut conn = self.manager.clone();
        let redis_key = format!("lockout:{}", key);
        let exists: bool = redis::cmd("EXISTS")
            .arg(&redis_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("lockout check failed: {}", e))?;
        Ok(exists)
    }

    async fn set_lockout(&self, key: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let redis_key = format!("lockout:{}", key);
        redis::cmd("SET")
            .arg(&redis_key)
            .arg("1")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("lockout set failed: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for RedisStore {
    async fn revoke(&self, jti: &str) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let key = format!("revoked:{}", jti);
        redis::cmd("SET")
            .arg(&key)
            .arg("1")
            .arg("EX")
            .arg(24 * 3600)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("failed to revoke token: {}", e))?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> anyhow::Result<bool> {
        let mut conn = self.manager.clone();
        let key = format!("revoked:{}", jti);
        let exists: bool = redis::cmd("EXISTS")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("failed to check revocation: {}", e))?;
        Ok(exists)
    }
}
