pub mod api;
pub mod dashboard;
pub mod health;
pub mod host;
pub mod setup;
pub mod viewer;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;

pub use host::create_dashboard_router;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/health", health::health_routes(state.clone()))
        .nest("/dashboard", dashboard::dashboard_routes(state.clone()))
        .nest(
            "/api",
            api::api_routes(state.clone()).nest("/setup", setup::setup_routes(state)),
        )
        .merge(viewer::viewer_routes())
        .fallback(not_found)
}

/// Service banner with the main entry points
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Wander Developer Environment API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "api": "/api",
            "dashboard": "/dashboard",
            "setup": "/setup"
        }
    }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Not found" })),
    )
}
