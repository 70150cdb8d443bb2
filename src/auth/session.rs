use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A live login. Only the digest of the bearer token is persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub donor_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SessionRow {
    donor_id: String,
    expires_at: NaiveDateTime,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Session {
            donor_id: Uuid::parse_str(&row.donor_id).map_err(|e| AppError::Store(e.to_string()))?,
            expires_at: DateTime::from_naive_utc_and_offset(row.expires_at, Utc),
        })
    }
}

pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, donor_id: Uuid, token: &str, expires_at: DateTime<Utc>) -> Result<Session> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, donor_id, token_hash, expires_at, created_at, last_used_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(donor_id.to_string())
        .bind(digest(token))
        .bind(expires_at.naive_utc())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Session { donor_id, expires_at })
    }

    /// Touches and returns the unexpired session behind `token`.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let now = Utc::now().naive_utc();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE sessions SET last_used_at = ?
            WHERE token_hash = ? AND expires_at > ?
            RETURNING donor_id, expires_at
            "#
        )
        .bind(now)
        .bind(digest(token))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Session::try_from).transpose()
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(digest(token))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
