//! Routes served by `wander-dashboard`, the host-side companion process.
//!
//! It runs outside the compose stack, so readiness comes from the container
//! runtime and published ports instead of live database and cache clients.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use super::setup::ComponentsResponse;
use crate::services::inventory;
use crate::services::readiness::{HostReadiness, SetupProgress};
use crate::state::DashboardState;

pub fn create_dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/setup/progress", get(get_progress))
        .route("/api/setup/components", get(get_components))
        .fallback(not_found)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "dashboard-backend" }))
}

async fn get_progress(State(state): State<DashboardState>) -> Json<SetupProgress> {
    let readiness = HostReadiness {
        config: &state.config,
        http: &state.http,
        runtime: state.runtime.as_ref(),
    };
    Json(readiness.aggregate().await)
}

async fn get_components(State(state): State<DashboardState>) -> Json<ComponentsResponse> {
    let docker_version = state.runtime.version().await;
    Json(ComponentsResponse {
        components: inventory::host_components(docker_version),
    })
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
