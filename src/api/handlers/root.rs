use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use crate::{api::state::AppState, service::with_store_timeout};

#[derive(Serialize)]
pub struct ApiInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub cycle: &'static str,
    pub route_groups: Vec<RouteGroup>,
}

#[derive(Serialize)]
pub struct RouteGroup {
    pub prefix: &'static str,
    pub access: &'static str,
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Hive",
        "version": env!("CARGO_PKG_VERSION"),
        "info": "/api",
        "health": "/health",
    }))
}

/// Reports `degraded` with 503 when the ledger store cannot answer.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let limit = Duration::from_secs(state.settings.database.store_timeout_secs);
    let pool = &state.service_context.db_pool;

    let ping = with_store_timeout(limit, async {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    })
    .await;

    match ping {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy", "store": "ok" }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "store": "unreachable" })),
            )
        }
    }
}

pub async fn api_info() -> impl IntoResponse {
    Json(ApiInfo {
        name: "Hive",
        version: env!("CARGO_PKG_VERSION"),
        cycle: "calendar month",
        route_groups: vec![
            RouteGroup { prefix: "/auth", access: "public" },
            RouteGroup { prefix: "/public", access: "public" },
            RouteGroup { prefix: "/api/donate", access: "public, monthly needs a session" },
            RouteGroup { prefix: "/api", access: "donor session" },
            RouteGroup { prefix: "/admin", access: "admin session" },
        ],
    })
}
