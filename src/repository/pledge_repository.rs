use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Pledge, PledgeStatus},
    error::{AppError, Result},
    repository::PledgeRepository,
};

#[derive(FromRow)]
struct PledgeRow {
    id: String,
    user_id: String,
    amount: i64,
    tier_name: String,
    status: String,
    next_payment_date: NaiveDateTime,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PLEDGE_COLUMNS: &str =
    "id, user_id, amount, tier_name, status, next_payment_date, created_at, updated_at";

pub struct SqlitePledgeRepository {
    pool: SqlitePool,
}

impl SqlitePledgeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_pledge(row: PledgeRow) -> Result<Pledge> {
        Ok(Pledge {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Store(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Store(e.to_string()))?,
            amount: row.amount,
            tier_name: row.tier_name,
            status: Self::parse_pledge_status(&row.status)?,
            next_payment_date: DateTime::from_naive_utc_and_offset(row.next_payment_date, Utc),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_pledge_status(s: &str) -> Result<PledgeStatus> {
        match s {
            "active" => Ok(PledgeStatus::Active),
            "paused" => Ok(PledgeStatus::Paused),
            "cancelled" => Ok(PledgeStatus::Cancelled),
            _ => Err(AppError::Store(format!("Invalid pledge status: {}", s))),
        }
    }

    async fn fetch_one_where(&self, clause: &str, bind: String) -> Result<Option<Pledge>> {
        let sql = format!("SELECT {} FROM pledges WHERE {}", PLEDGE_COLUMNS, clause);
        let row = sqlx::query_as::<_, PledgeRow>(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        row.map(Self::row_to_pledge).transpose()
    }
}

#[async_trait]
impl PledgeRepository for SqlitePledgeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pledge>> {
        self.fetch_one_where("id = ?", id.to_string()).await
    }

    async fn find_by_donor(&self, user_id: Uuid) -> Result<Option<Pledge>> {
        self.fetch_one_where("user_id = ?", user_id.to_string()).await
    }

    async fn find_active_by_donor(&self, user_id: Uuid) -> Result<Option<Pledge>> {
        self.fetch_one_where("user_id = ? AND status = 'active'", user_id.to_string())
            .await
    }

    async fn upsert_for_donor(
        &self,
        user_id: Uuid,
        amount: i64,
        tier_name: &str,
        next_payment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Pledge> {
        let now_naive = now.naive_utc();

        // SET expressions see the pre-update row, so the CASE reads the old status.
        sqlx::query(
            r#"
            INSERT INTO pledges (
                id, user_id, amount, tier_name, status,
                next_payment_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, 'active', ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                amount = excluded.amount,
                tier_name = excluded.tier_name,
                next_payment_date = CASE
                    WHEN pledges.status = 'active' THEN pledges.next_payment_date
                    ELSE excluded.next_payment_date
                END,
                status = 'active',
                updated_at = excluded.updated_at
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(amount)
        .bind(tier_name)
        .bind(next_payment_date.naive_utc())
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        self.find_by_donor(user_id).await?.ok_or_else(|| {
            AppError::Store("Failed to retrieve upserted pledge".to_string())
        })
    }

    async fn update_status(&self, id: Uuid, status: PledgeStatus, now: DateTime<Utc>) -> Result<Pledge> {
        let result = sqlx::query(
            "UPDATE pledges SET status = ?, updated_at = ? WHERE id = ?"
        )
        .bind(status.as_str())
        .bind(now.naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pledge not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Store("Failed to retrieve updated pledge".to_string())
        })
    }

    async fn update_next_payment_date(
        &self,
        id: Uuid,
        next_payment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Pledge> {
        let result = sqlx::query(
            "UPDATE pledges SET next_payment_date = ?, updated_at = ? WHERE id = ?"
        )
        .bind(next_payment_date.naive_utc())
        .bind(now.naive_utc())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pledge not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Store("Failed to retrieve updated pledge".to_string())
        })
    }

    async fn list(&self) -> Result<Vec<Pledge>> {
        let sql = format!("SELECT {} FROM pledges ORDER BY created_at ASC", PLEDGE_COLUMNS);
        let rows = sqlx::query_as::<_, PledgeRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_pledge)
            .collect()
    }

    async fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Pledge>> {
        let sql = format!(
            "SELECT {} FROM pledges WHERE status = 'active' AND next_payment_date <= ? ORDER BY next_payment_date ASC",
            PLEDGE_COLUMNS
        );
        let rows = sqlx::query_as::<_, PledgeRow>(&sql)
            .bind(as_of.naive_utc())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_pledge)
            .collect()
    }
}
