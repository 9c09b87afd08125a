//! Postgres-backed ports, grounded on the teacher's `services::database`
//! bare-query idiom (`sqlx::query`/`query_as` with explicit binds, mapped to
//! `AppError`/`anyhow` on failure) rather than compile-time checked macros,
//! since this crate's tables are hand-rolled migrations instead of the
//! teacher's schema.

use crate::models::{OtpRecord, OtpStatus, SessionRecord, UserRecord};
use crate::ports::{AuthTransactor, NewUserAndSession, OtpStore, SessionStore, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, Row};

#[derive(Clone)]
pub struct PostgresAuthStore {
    pool: PgPool,
}

impl PostgresAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn otp_status_str(status: OtpStatus) -> &'static str {
    status.as_str()
}

#[async_trait]
impl OtpStore for PostgresAuthStore {
    async fn create(&self, record: OtpRecord) -> anyhow::Result<()> {
        let existing = sqlx::query(
            "SELECT status, expires_at FROM otp_records WHERE phone_hash = $1",
        )
        .bind(&record.phone_hash)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            let status: String = row.try_get("status")?;
            let expires_at: DateTime<Utc> = row.try_get("expires_at")?;
            if status == "pending" && expires_at > Utc::now() {
                return Err(anyhow::Error::from(crate::error::DomainError::AlreadyExists)
                    .context("create otp: active record exists"));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO otp_records
                (phone_hash, otp_mac, status, attempt_count, created_at, expires_at, ttl)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (phone_hash) DO UPDATE SET
                otp_mac = EXCLUDED.otp_mac,
                status = EXCLUDED.status,
                attempt_count = EXCLUDED.attempt_count,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at,
                ttl = EXCLUDED.ttl
            "#,
        )
        .bind(&record.phone_hash)
        .bind(&record.otp_mac)
        .bind(otp_status_str(record.status))
        .bind(record.attempt_count)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.ttl)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, phone_hash: &str) -> anyhow::Result<Option<OtpRecord>> {
        let row = sqlx::query(
            "SELECT phone_hash, otp_mac, status, attempt_count, created_at, expires_at, ttl \
             FROM otp_records WHERE phone_hash = $1",
        )
        .bind(phone_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => Some(OtpRecord {
                phone_hash: row.try_get("phone_hash")?,
                otp_mac: row.try_get("otp_mac")?,
                status: OtpStatus::parse(&row.try_get::<String, _>("status")?),
                attempt_count: row.try_get("attempt_count")?,
                created_at: row.try_get("created_at")?,
                expires_at: row.try_get("expires_at")?,
                ttl: row.try_get("ttl")?,
            }),
            None => None,
        })
    }

    async fn increment_attempts(&self, phone_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE otp_records SET attempt_count = attempt_count + 1 WHERE phone_hash = $1")
            .bind(phone_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_verified(&self, phone_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE otp_records SET status = 'verified' WHERE phone_hash = $1")
            .bind(phone_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresAuthStore {
    async fn get_by_id(&self, user_id: &str) -> anyhow::Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT user_id, phone_number, display_name, created_at, updated_at \
             FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_user).transpose()?)
    }

    async fn find_by_phone(&self, phone_number: &str) -> anyhow::Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT user_id, phone_number, display_name, created_at, updated_at \
             FROM users WHERE phone_number = $1",
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_user).transpose()?)
    }
}

fn row_to_user(row: sqlx::postgres::PgRow) -> anyhow::Result<UserRecord> {
    Ok(UserRecord {
        user_id: row.try_get("user_id")?,
        phone_number: row.try_get("phone_number")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_session(row: sqlx::postgres::PgRow) -> anyhow::Result<SessionRecord> {
    Ok(SessionRecord {
        session_id: row.try_get("session_id")?,
        user_id: row.try_get("user_id")?,
        device_id: row.try_get("device_id")?,
        refresh_token_hash: row.try_get("refresh_token_hash")?,
        prev_token_hash: row.try_get("prev_token_hash")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
        token_generation: row.try_get("token_generation")?,
        ttl: row.try_get("ttl")?,
    })
}

const SESSION_COLUMNS: &str = "session_id, user_id, device_id, refresh_token_hash, \
     prev_token_hash, created_at, expires_at, token_generation, ttl";

#[async_trait]
impl SessionStore for PostgresAuthStore {
    async fn create(&self, session: SessionRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions
                (session_id, user_id, device_id, refresh_token_hash, prev_token_hash,
                 created_at, expires_at, token_generation, ttl)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.user_id)
        .bind(&session.device_id)
        .bind(&session.refresh_token_hash)
        .bind(&session.prev_token_hash)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.token_generation)
        .bind(session.ttl)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_id(&self, session_id: &str) -> anyhow::Result<Option<SessionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_session).transpose()?)
    }

    async fn list_by_user(&self, user_id: &str) -> anyhow::Result<Vec<SessionRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_session).collect()
    }

    async fn update(
        &self,
        session_id: &str,
        expected_generation: i64,
        new_refresh_token_hash: String,
        new_prev_token_hash: Option<String>,
        new_expires_at: DateTime<Utc>,
        new_ttl: i64,
    ) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                refresh_token_hash = $1,
                prev_token_hash = $2,
                token_generation = token_generation + 1,
                expires_at = $3,
                ttl = $4
            WHERE session_id = $5 AND token_generation = $6
            "#,
        )
        .bind(&new_refresh_token_hash)
        .bind(&new_prev_token_hash)
        .bind(new_expires_at)
        .bind(new_ttl)
        .bind(session_id)
        .bind(expected_generation)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!(
                "conditional update failed: session {} not at expected generation {}",
                session_id,
                expected_generation
            ));
        }
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuthTransactor for PostgresAuthStore {
    async fn verify_otp_and_create_user(
        &self,
        phone_hash: &str,
        new_user_and_session: NewUserAndSession,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (user_id, phone_number, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (phone_number) DO NOTHING
            "#,
        )
        .bind(&new_user_and_session.user_id)
        .bind(&new_user_and_session.phone_number)
        .bind(&new_user_and_session.display_name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(anyhow::Error::from(crate::error::DomainError::AlreadyExists)
                .context("verify otp and create user: phone sentinel conflict"));
        }

        let session = &new_user_and_session.session;
        sqlx::query(
            r#"
            INSERT INTO sessions
                (session_id, user_id, device_id, refresh_token_hash, prev_token_hash,
                 created_at, expires_at, token_generation, ttl)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.user_id)
        .bind(&session.device_id)
        .bind(&session.refresh_token_hash)
        .bind(&session.prev_token_hash)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.token_generation)
        .bind(session.ttl)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE otp_records SET status = 'verified' WHERE phone_hash = $1")
            .bind(phone_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn verify_otp_and_create_session(
        &self,
        phone_hash: &str,
        session: SessionRecord,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sessions
                (session_id, user_id, device_id, refresh_token_hash, prev_token_hash,
                 created_at, expires_at, token_generation, ttl)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.user_id)
        .bind(&session.device_id)
        .bind(&session.refresh_token_hash)
        .bind(&session.prev_token_hash)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.token_generation)
        .bind(session.ttl)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE otp_records SET status = 'verified' WHERE phone_hash = $1")
            .bind(phone_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
