use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactStory {
    pub id: Uuid,
    pub title: String,
    pub category: StoryCategory,
    pub image_url: String,
    pub description: String,
    pub date_distributed: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoryCategory {
    Orphans,
    Widows,
    Community,
    Education,
}

impl StoryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryCategory::Orphans => "Orphans",
            StoryCategory::Widows => "Widows",
            StoryCategory::Community => "Community",
            StoryCategory::Education => "Education",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateImpactStoryRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    pub category: StoryCategory,
    #[validate(url(message = "must be a valid http(s) image URL"))]
    pub image_url: String,
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    pub date_distributed: NaiveDate,
}
