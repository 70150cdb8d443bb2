use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::state::AppState,
    domain::{ImpactStory, Tier},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct StoriesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    24
}

pub async fn list_tiers(State(state): State<AppState>) -> Json<Vec<Tier>> {
    Json(state.service_context.ledger_service.tiers().tiers().to_vec())
}

pub async fn list_impact_stories(
    State(state): State<AppState>,
    Query(params): Query<StoriesQuery>,
) -> Result<Json<Vec<ImpactStory>>> {
    let stories = state.service_context.impact_story_service
        .list(params.limit)
        .await?;

    Ok(Json(stories))
}
