use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::{Donor, SessionContext},
    error::AppError,
};

/// Resolved caller, inserted into request extensions by the auth layers.
#[derive(Clone)]
pub struct CurrentUser {
    pub donor: Donor,
    pub session: SessionContext,
}

async fn resolve_user(state: &AppState, jar: &CookieJar) -> Result<Option<CurrentUser>, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let resolved = state.service_context.auth_service
        .resolve(cookie.value())
        .await?;

    Ok(resolved.map(|(donor, session)| CurrentUser { donor, session }))
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_user(&state, &jar)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_user(&state, &jar)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.session.is_admin() {
        tracing::warn!(donor_id = %user.donor.id, "Non-admin denied admin route");
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn optional_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, &jar).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Session lookup failed, continuing anonymously: {}", e),
    }

    next.run(request).await
}
