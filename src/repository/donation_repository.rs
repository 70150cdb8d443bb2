use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Donation, DonationStatus, NewDonation},
    error::{AppError, Result},
    repository::DonationRepository,
};

#[derive(FromRow)]
struct DonationRow {
    id: String,
    user_id: Option<String>,
    amount: i64,
    created_at: NaiveDateTime,
    status: String,
    reference_id: String,
    is_anonymous: i32,
    message: Option<String>,
}

const DONATION_COLUMNS: &str =
    "id, user_id, amount, created_at, status, reference_id, is_anonymous, message";

pub struct SqliteDonationRepository {
    pool: SqlitePool,
}

impl SqliteDonationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_donation(row: DonationRow) -> Result<Donation> {
        let user_id = row
            .user_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(Donation {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Store(e.to_string()))?,
            user_id,
            amount: row.amount,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            status: Self::parse_donation_status(&row.status)?,
            reference_id: row.reference_id,
            is_anonymous: row.is_anonymous != 0,
            message: row.message,
        })
    }

    fn parse_donation_status(s: &str) -> Result<DonationStatus> {
        match s {
            "successful" => Ok(DonationStatus::Successful),
            _ => Err(AppError::Store(format!("Invalid donation status: {}", s))),
        }
    }
}

#[async_trait]
impl DonationRepository for SqliteDonationRepository {
    async fn create(&self, donation: NewDonation, created_at: DateTime<Utc>) -> Result<Donation> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO donations (
                id, user_id, amount, created_at, status,
                reference_id, is_anonymous, message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(donation.user_id.map(|u| u.to_string()))
        .bind(donation.amount)
        .bind(created_at.naive_utc())
        .bind(DonationStatus::Successful.as_str())
        .bind(&donation.reference_id)
        .bind(if donation.is_anonymous { 1i32 } else { 0i32 })
        .bind(&donation.message)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Store("Failed to retrieve created donation".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>> {
        let sql = format!("SELECT {} FROM donations WHERE id = ?", DONATION_COLUMNS);
        let row = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        row.map(Self::row_to_donation).transpose()
    }

    async fn find_by_reference(&self, reference_id: &str) -> Result<Option<Donation>> {
        let sql = format!("SELECT {} FROM donations WHERE reference_id = ?", DONATION_COLUMNS);
        let row = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(reference_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        row.map(Self::row_to_donation).transpose()
    }

    async fn find_by_donor(&self, user_id: Uuid) -> Result<Vec<Donation>> {
        let sql = format!(
            "SELECT {} FROM donations WHERE user_id = ? ORDER BY created_at DESC",
            DONATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_donation)
            .collect()
    }

    async fn find_by_donor_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Donation>> {
        let sql = format!(
            r#"
            SELECT {} FROM donations
            WHERE user_id = ? AND created_at >= ? AND created_at < ?
            ORDER BY created_at DESC
            "#,
            DONATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, DonationRow>(&sql)
            .bind(user_id.to_string())
            .bind(start.naive_utc())
            .bind(end.naive_utc())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_donation)
            .collect()
    }

    async fn list_attributed(&self) -> Result<Vec<Donation>> {
        let sql = format!(
            "SELECT {} FROM donations WHERE user_id IS NOT NULL ORDER BY created_at DESC",
            DONATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, DonationRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_donation)
            .collect()
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
