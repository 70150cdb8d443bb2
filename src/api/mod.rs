pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        .route("/api", get(handlers::root::api_info))

        // Auth routes
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Public routes (website content)
        .nest("/public", public_routes())

        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))

        .with_state(app_state)

        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(giving_routes(state.clone()))
        .merge(donor_routes(state))
}

// Anonymous visitors may give; a session is attached when present.
fn giving_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/donate", post(handlers::donations::donate))
        .route("/donations", post(handlers::donations::record))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::optional_auth,
        ))
}

fn donor_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/dashboard", get(handlers::pledges::dashboard))
        .route("/pledge/status", get(handlers::pledges::cycle_status))
        .route("/pledges", post(handlers::pledges::create_or_update))
        .route("/pledges/:id/cancel", post(handlers::pledges::cancel))
        .route("/pledges/:id/pause", post(handlers::pledges::pause))
        .route("/pledges/:id/reactivate", post(handlers::pledges::reactivate))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/tiers", get(handlers::public::list_tiers))
        .route("/impact-stories", get(handlers::public::list_impact_stories))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/donors", get(handlers::admin::list_donors))
        .route("/donors/:id/reminder", get(handlers::admin::reminder))
        .route("/stats", get(handlers::admin::stats))
        .route("/reconcile", post(handlers::admin::reconcile))
        .route("/impact-stories", post(handlers::admin::create_impact_story))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
