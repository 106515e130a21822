//! Session tokens and the users they belong to.
//!
//! ARCHITECTURE
//! ============
//! HTTP auth uses opaque random tokens stored in the `sessions` table and
//! carried in an HttpOnly cookie. Storage sits behind `SessionStore` so route
//! tests can run against an in-memory implementation.
//!
//! TRADE-OFFS
//! ==========
//! Expired rows are filtered at lookup time rather than swept, keeping
//! validation a single indexed query.

use async_trait::async_trait;
use rand::Rng;
use sqlx::{PgPool, Row};
use time::Duration;
use uuid::Uuid;

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// User row returned from session validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for `user_id` valid for `ttl`, returning the token.
    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<String, sqlx::Error>;

    /// Resolve an unexpired token to its user.
    async fn validate_session(&self, token: &str) -> Result<Option<SessionUser>, sqlx::Error>;

    async fn delete_session(&self, token: &str) -> Result<(), sqlx::Error>;

    /// Find or create the user with this display name.
    async fn upsert_user(&self, name: &str) -> Result<SessionUser, sqlx::Error>;
}

/// `SessionStore` backed by Postgres.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<String, sqlx::Error> {
        let token = generate_token();
        let expires_at = time::OffsetDateTime::now_utc() + ttl;
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    async fn validate_session(&self, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
        let row = sqlx::query(
            r"SELECT u.id, u.name
              FROM sessions s
              JOIN users u ON u.id = s.user_id
              WHERE s.token = $1 AND s.expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| SessionUser { id: r.get("id"), name: r.get("name") }))
    }

    async fn delete_session(&self, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_user(&self, name: &str) -> Result<SessionUser, sqlx::Error> {
        let row = sqlx::query(
            "INSERT INTO users (id, name) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(SessionUser { id: row.get("id"), name: row.get("name") })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
