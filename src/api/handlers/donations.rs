use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{DonateOutcome, DonateRequest, Donation, RecordDonationRequest},
    error::Result,
};

/// Donation form submission. Monthly pledges need a signed-in donor;
/// one-time gifts may be anonymous.
pub async fn donate(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(req): Json<DonateRequest>,
) -> Result<(StatusCode, Json<DonateOutcome>)> {
    let session = user.as_ref().map(|Extension(u)| &u.session);
    let outcome = state.service_context.ledger_service
        .donate(session, req)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn record(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(req): Json<RecordDonationRequest>,
) -> Result<(StatusCode, Json<Donation>)> {
    let session = user.as_ref().map(|Extension(u)| &u.session);
    let donation = state.service_context.ledger_service
        .record_donation(session, req)
        .await?;

    Ok((StatusCode::CREATED, Json(donation)))
}
