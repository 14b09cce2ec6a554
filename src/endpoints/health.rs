use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::probe;
use crate::state::AppState;

pub fn health_routes(state: AppState) -> Router {
    Router::new().route("/", get(health_check)).with_state(state)
}

/// Health of one dependency as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyHealth {
    Healthy,
    Unhealthy,
}

impl From<bool> for DependencyHealth {
    fn from(reachable: bool) -> Self {
        if reachable {
            DependencyHealth::Healthy
        } else {
            DependencyHealth::Unhealthy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
struct HealthServices {
    api: DependencyHealth,
    database: DependencyHealth,
    redis: DependencyHealth,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: OverallHealth,
    timestamp: DateTime<Utc>,
    uptime: f64,
    services: HealthServices,
}

/// Liveness plus dependency reachability; 503 if any dependency is down
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, redis) = tokio::join!(
        probe::database_reachable(&state.db),
        probe::cache_reachable(state.cache.as_ref()),
    );

    let (status, code) = if database && redis {
        (OverallHealth::Healthy, StatusCode::OK)
    } else {
        tracing::warn!(
            "Health degraded: database reachable = {}, redis reachable = {}",
            database,
            redis
        );
        (OverallHealth::Degraded, StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now(),
            uptime: state.uptime_secs(),
            services: HealthServices {
                api: DependencyHealth::Healthy,
                database: database.into(),
                redis: redis.into(),
            },
        }),
    )
}
