use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{CreateDonorRequest, Donor, Role},
    error::{AppError, Result},
    repository::DonorRepository,
};

#[derive(FromRow)]
struct DonorRow {
    id: String,
    email: String,
    full_name: String,
    phone_number: String,
    role: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteDonorRepository {
    pool: SqlitePool,
}

impl SqliteDonorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_donor(row: DonorRow) -> Result<Donor> {
        Ok(Donor {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Store(e.to_string()))?,
            email: row.email,
            full_name: row.full_name,
            phone_number: row.phone_number,
            role: Self::parse_role(&row.role)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_role(s: &str) -> Result<Role> {
        match s {
            "donor" => Ok(Role::Donor),
            "admin" => Ok(Role::Admin),
            _ => Err(AppError::Store(format!("Invalid donor role: {}", s))),
        }
    }
}

#[async_trait]
impl DonorRepository for SqliteDonorRepository {
    async fn create(&self, request: CreateDonorRequest, password_hash: String) -> Result<Donor> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let role = request.role.unwrap_or(Role::Donor);

        sqlx::query(
            r#"
            INSERT INTO donors (
                id, email, full_name, phone_number, role,
                password_hash, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(request.email.trim().to_lowercase())
        .bind(request.full_name.trim())
        .bind(request.phone_number.trim())
        .bind(role.as_str())
        .bind(&password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Store("Failed to retrieve created donor".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donor>> {
        let row = sqlx::query_as::<_, DonorRow>(
            r#"
            SELECT id, email, full_name, phone_number, role, created_at, updated_at
            FROM donors
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        row.map(Self::row_to_donor).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Donor>> {
        let row = sqlx::query_as::<_, DonorRow>(
            r#"
            SELECT id, email, full_name, phone_number, role, created_at, updated_at
            FROM donors
            WHERE email = ?
            "#
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        row.map(Self::row_to_donor).transpose()
    }

    async fn find_password_hash(&self, email: &str) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM donors WHERE email = ?"
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    async fn list_with_activity(&self) -> Result<Vec<Donor>> {
        let rows = sqlx::query_as::<_, DonorRow>(
            r#"
            SELECT d.id, d.email, d.full_name, d.phone_number, d.role,
                   d.created_at, d.updated_at
            FROM donors d
            WHERE EXISTS (SELECT 1 FROM pledges p WHERE p.user_id = d.id)
               OR EXISTS (SELECT 1 FROM donations n WHERE n.user_id = d.id)
            ORDER BY d.full_name ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_donor)
            .collect()
    }
}
