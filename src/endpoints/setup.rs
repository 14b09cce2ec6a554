use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::services::inventory::{self, Component};
use crate::services::readiness::SetupProgress;
use crate::services::test_results::{self, TestResults};
use crate::state::AppState;

pub fn setup_routes(state: AppState) -> Router {
    Router::new()
        .route("/progress", get(get_progress))
        .route("/components", get(get_components))
        .route("/test-results", get(get_test_results))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ComponentsResponse {
    pub components: Vec<Component>,
}

// GET /api/setup/progress
async fn get_progress(State(state): State<AppState>) -> Json<SetupProgress> {
    let progress = state.readiness().aggregate().await;
    tracing::debug!(
        "Setup progress {}% (all healthy: {})",
        progress.overall_progress,
        progress.all_healthy
    );
    Json(progress)
}

// GET /api/setup/components
async fn get_components(State(state): State<AppState>) -> Json<ComponentsResponse> {
    let components = inventory::load_components(
        &state.config.setup.backend_manifest,
        &state.config.setup.frontend_manifest,
    )
    .await;

    Json(ComponentsResponse { components })
}

// GET /api/setup/test-results
async fn get_test_results(State(state): State<AppState>) -> Json<TestResults> {
    Json(test_results::run(&state.config, state.runtime.as_ref(), &state.http).await)
}
