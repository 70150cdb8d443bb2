use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::{AuthService, SESSION_COOKIE},
    domain::{CreateDonorRequest, Donor, Role},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub donor: Donor,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Donor>)> {
    // Self-service accounts are always donors.
    let request = CreateDonorRequest {
        email: req.email,
        password: req.password,
        full_name: req.full_name,
        phone_number: req.phone_number,
        role: Some(Role::Donor),
    };

    let donor = state.service_context.auth_service.signup(request).await?;
    Ok((StatusCode::CREATED, Json(donor)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let auth_service = &state.service_context.auth_service;
    let (donor, token) = auth_service.login(&req.email, &req.password).await?;

    let cookie = auth_service.create_session_cookie(&token, state.settings.auth.secure_cookies);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            donor,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.service_context.auth_service
            .invalidate_session(session_cookie.value())
            .await
        {
            tracing::warn!("Failed to invalidate session on logout: {}", e);
        }
    }

    let jar = jar.add(AuthService::create_logout_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<Donor> {
    Json(user.donor)
}
