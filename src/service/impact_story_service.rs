use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::{
    domain::{CreateImpactStoryRequest, ImpactStory, SessionContext},
    error::{AppError, Result},
    repository::ImpactStoryRepository,
};
use super::with_store_timeout;

pub struct ImpactStoryService {
    repo: Arc<dyn ImpactStoryRepository>,
    store_timeout: Duration,
}

impl ImpactStoryService {
    pub fn new(repo: Arc<dyn ImpactStoryRepository>, store_timeout: Duration) -> Self {
        Self { repo, store_timeout }
    }

    /// List the most recent distributions
    pub async fn list(&self, limit: i64) -> Result<Vec<ImpactStory>> {
        with_store_timeout(self.store_timeout, self.repo.list(limit.clamp(1, 100))).await
    }

    /// Publish a new story (admins only)
    pub async fn create(
        &self,
        session: &SessionContext,
        request: CreateImpactStoryRequest,
    ) -> Result<ImpactStory> {
        if !session.is_admin() {
            return Err(AppError::Forbidden);
        }

        request.validate()?;

        let url = request.image_url.trim().to_lowercase();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Validation(
                "image_url: must start with http:// or https://".to_string(),
            ));
        }

        if request.title.trim().is_empty() || request.description.trim().is_empty() {
            return Err(AppError::Validation(
                "Title and description are required".to_string(),
            ));
        }

        let story = with_store_timeout(self.store_timeout, self.repo.create(request)).await?;
        tracing::info!(story_id = %story.id, category = story.category.as_str(), "Impact story published");
        Ok(story)
    }
}
