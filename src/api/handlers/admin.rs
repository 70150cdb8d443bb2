use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{AdminDonorView, CreateImpactStoryRequest, ImpactStory, OverviewFilter, OverviewStats, Pledge},
    error::Result,
    service::ReminderLink,
};

#[derive(Debug, Serialize)]
pub struct DonorListResponse {
    pub donors: Vec<AdminDonorView>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub advanced: Vec<Pledge>,
    pub count: usize,
}

pub async fn list_donors(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<OverviewFilter>,
) -> Result<Json<DonorListResponse>> {
    let donors = state.service_context.overview_service
        .list_donor_overview(&user.session, &filter)
        .await?;

    let total = donors.len();
    Ok(Json(DonorListResponse { donors, total }))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<OverviewStats>> {
    let stats = state.service_context.overview_service
        .stats(&user.session)
        .await?;

    Ok(Json(stats))
}

pub async fn reminder(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(donor_id): Path<Uuid>,
) -> Result<Json<ReminderLink>> {
    let link = state.service_context.overview_service
        .reminder_link(&user.session, donor_id)
        .await?;

    Ok(Json(link))
}

pub async fn reconcile(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<ReconcileResponse>> {
    let advanced = state.service_context.ledger_service
        .reconcile_due_pledges()
        .await?;

    let count = advanced.len();
    Ok(Json(ReconcileResponse { advanced, count }))
}

pub async fn create_impact_story(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateImpactStoryRequest>,
) -> Result<(StatusCode, Json<ImpactStory>)> {
    let story = state.service_context.impact_story_service
        .create(&user.session, req)
        .await?;

    Ok((StatusCode::CREATED, Json(story)))
}
