//! Health and root handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db;
use crate::state::AppState;

pub async fn root() -> &'static str {
    "Plateforme de prêt API"
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = db::check_health(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if database_ok { "healthy" } else { "unhealthy" },
        database: if database_ok { "connected" } else { "error" },
        version: env!("CARGO_PKG_VERSION"),
    })
}
