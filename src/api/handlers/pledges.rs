use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CycleStatus, Pledge},
    error::Result,
    service::DonorDashboard,
};

#[derive(Debug, Deserialize)]
pub struct PledgeAmountRequest {
    pub amount: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelPledgeRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct CycleStatusResponse {
    pub current_cycle_status: CycleStatus,
}

pub async fn create_or_update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<PledgeAmountRequest>,
) -> Result<(StatusCode, Json<Pledge>)> {
    let pledge = state.service_context.ledger_service
        .create_or_update_pledge(&user.session, req.amount)
        .await?;

    Ok((StatusCode::OK, Json(pledge)))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelPledgeRequest>,
) -> Result<Json<Pledge>> {
    let pledge = state.service_context.ledger_service
        .pause_or_cancel_pledge(&user.session, id, req.confirm)
        .await?;

    Ok(Json(pledge))
}

pub async fn pause(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Pledge>> {
    let pledge = state.service_context.ledger_service
        .pause_pledge(&user.session, id)
        .await?;

    Ok(Json(pledge))
}

pub async fn reactivate(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<PledgeAmountRequest>,
) -> Result<Json<Pledge>> {
    let pledge = state.service_context.ledger_service
        .reactivate_pledge(&user.session, id, req.amount)
        .await?;

    Ok(Json(pledge))
}

pub async fn cycle_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<CycleStatusResponse>> {
    let current_cycle_status = state.service_context.ledger_service
        .compute_current_cycle_status(user.session.donor_id)
        .await?;

    Ok(Json(CycleStatusResponse { current_cycle_status }))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<DonorDashboard>> {
    let dashboard = state.service_context.ledger_service
        .dashboard(&user.session)
        .await?;

    Ok(Json(dashboard))
}
