use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{CreateImpactStoryRequest, ImpactStory, StoryCategory},
    error::{AppError, Result},
    repository::ImpactStoryRepository,
};

#[derive(FromRow)]
struct ImpactStoryRow {
    id: String,
    title: String,
    category: String,
    image_url: String,
    description: String,
    date_distributed: NaiveDate,
    created_at: NaiveDateTime,
}

pub struct SqliteImpactStoryRepository {
    pool: SqlitePool,
}

impl SqliteImpactStoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_story(row: ImpactStoryRow) -> Result<ImpactStory> {
        Ok(ImpactStory {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Store(e.to_string()))?,
            title: row.title,
            category: Self::parse_category(&row.category)?,
            image_url: row.image_url,
            description: row.description,
            date_distributed: row.date_distributed,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn parse_category(s: &str) -> Result<StoryCategory> {
        match s {
            "Orphans" => Ok(StoryCategory::Orphans),
            "Widows" => Ok(StoryCategory::Widows),
            "Community" => Ok(StoryCategory::Community),
            "Education" => Ok(StoryCategory::Education),
            _ => Err(AppError::Store(format!("Invalid story category: {}", s))),
        }
    }
}

#[async_trait]
impl ImpactStoryRepository for SqliteImpactStoryRepository {
    async fn create(&self, request: CreateImpactStoryRequest) -> Result<ImpactStory> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO impact_stories (
                id, title, category, image_url, description,
                date_distributed, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(request.title.trim())
        .bind(request.category.as_str())
        .bind(request.image_url.trim())
        .bind(request.description.trim())
        .bind(request.date_distributed)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Store("Failed to retrieve created impact story".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ImpactStory>> {
        let row = sqlx::query_as::<_, ImpactStoryRow>(
            r#"
            SELECT id, title, category, image_url, description, date_distributed, created_at
            FROM impact_stories
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        row.map(Self::row_to_story).transpose()
    }

    async fn list(&self, limit: i64) -> Result<Vec<ImpactStory>> {
        let rows = sqlx::query_as::<_, ImpactStoryRow>(
            r#"
            SELECT id, title, category, image_url, description, date_distributed, created_at
            FROM impact_stories
            ORDER BY date_distributed DESC, created_at DESC
            LIMIT ?
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_story)
            .collect()
    }
}
