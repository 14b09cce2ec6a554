use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::db;
use crate::error::{AppError, Result};
use crate::services::probe;
use crate::state::AppState;

const CACHE_TEST_KEY: &str = "test:connection";
const CACHE_TEST_TTL: Duration = Duration::from_secs(10);
const DATA_TTL: Duration = Duration::from_secs(3600);

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/status", get(service_status))
        .route("/db-test", get(db_test))
        .route("/cache-test", get(cache_test))
        .route("/data", post(store_data))
        .route("/data/{key}", get(get_data))
        .with_state(state)
}

fn data_key(key: &str) -> String {
    format!("data:{}", key)
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHealth {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub status: ServiceHealth,
    pub message: &'static str,
}

impl ServiceStatus {
    fn probed(name: &'static str, reachable: bool, up: &'static str, down: &'static str) -> Self {
        if reachable {
            Self {
                name,
                status: ServiceHealth::Healthy,
                message: up,
            }
        } else {
            Self {
                name,
                status: ServiceHealth::Unhealthy,
                message: down,
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub services: Vec<ServiceStatus>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(message: &'static str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message),
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CacheTestData {
    pub set: String,
    pub retrieved: Option<String>,
    #[serde(rename = "match")]
    pub matches: bool,
}

#[derive(Debug, Serialize)]
pub struct DataEntry {
    pub key: String,
    pub value: Value,
}

/// Values treated as "not provided": null, empty string, `false` and zero
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Keys may be sent as strings or numbers
fn key_string(key: &Value) -> Option<String> {
    if is_blank(key) {
        return None;
    }
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `{key, value}` from a request body; anything but a JSON object is rejected
fn data_fields(body: Value) -> Option<(String, Value)> {
    let Value::Object(mut fields) = body else {
        return None;
    };
    let key = fields.get("key").and_then(key_string)?;
    let value = fields.remove("value").filter(|v| !is_blank(v))?;
    Some((key, value))
}

// ============================================================================
// Handlers
// ============================================================================

// GET /api/status
async fn service_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (database, redis) = tokio::join!(
        probe::database_reachable(&state.db),
        probe::cache_reachable(state.cache.as_ref()),
    );

    Json(StatusResponse {
        services: vec![
            ServiceStatus::probed("Backend API", true, "API is running", ""),
            ServiceStatus::probed(
                "Database",
                database,
                "Connected to PostgreSQL",
                "Cannot connect to database",
            ),
            ServiceStatus::probed(
                "Redis Cache",
                redis,
                "Connected to Redis",
                "Cannot connect to Redis",
            ),
        ],
    })
}

// GET /api/db-test
async fn db_test(State(state): State<AppState>) -> Result<Json<ApiResponse<db::ServerInfo>>> {
    let info = db::server_info(&state.db)
        .await
        .map_err(|e| AppError::failed("Database connection failed", e))?;

    Ok(ApiResponse::ok("Database connection successful", info))
}

// GET /api/cache-test
async fn cache_test(State(state): State<AppState>) -> Result<Json<ApiResponse<CacheTestData>>> {
    let written = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    state
        .cache
        .set_ex(CACHE_TEST_KEY, &written, CACHE_TEST_TTL)
        .await
        .map_err(|e| AppError::failed("Redis connection failed", e))?;

    let retrieved = state
        .cache
        .get(CACHE_TEST_KEY)
        .await
        .map_err(|e| AppError::failed("Redis connection failed", e))?;

    let matches = retrieved.as_deref() == Some(written.as_str());

    Ok(ApiResponse::ok(
        "Redis connection successful",
        CacheTestData {
            set: written,
            retrieved,
            matches,
        },
    ))
}

// POST /api/data
async fn store_data(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<DataEntry>>> {
    let Json(body) = payload?;

    let (key, value) = data_fields(body)
        .ok_or_else(|| AppError::BadRequest("Key and value are required".to_string()))?;

    let encoded = serde_json::to_string(&value)?;
    state
        .cache
        .set_ex(&data_key(&key), &encoded, DATA_TTL)
        .await
        .map_err(|e| AppError::failed("Failed to store data", e))?;

    tracing::debug!("Stored {} ({} bytes)", data_key(&key), encoded.len());

    Ok(ApiResponse::ok("Data stored successfully", DataEntry { key, value }))
}

// GET /api/data/{key}
async fn get_data(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<DataEntry>>> {
    let raw = state
        .cache
        .get(&data_key(&key))
        .await
        .map_err(|e| AppError::failed("Failed to retrieve data", e))?
        .ok_or_else(|| AppError::NotFound("Key not found".to_string()))?;

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::failed("Failed to retrieve data", e))?;

    Ok(Json(ApiResponse {
        success: true,
        message: None,
        data: DataEntry { key, value },
    }))
}
