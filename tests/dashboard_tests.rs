//! GET /dashboard integration tests

use axum::http::StatusCode;

mod common;
use common::{default_app_state, get_json};

use wander::endpoints::create_router;

#[tokio::test]
async fn test_dashboard_reports_versions() {
    let (state, _cache) = default_app_state().await;

    let (status, body) = get_json(create_router(state), "/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    let services = &body["services"];
    assert_eq!(services["api"]["status"], "healthy");
    assert!(services["api"]["uptime"].as_f64().unwrap() >= 0.0);

    assert_eq!(services["database"]["status"], "healthy");
    assert!(services["database"]["version"]
        .as_str()
        .unwrap()
        .starts_with("SQLite "));
    assert!(services["database"]["time"].is_string());

    assert_eq!(services["redis"]["status"], "healthy");
    assert_eq!(services["redis"]["version"], "7.2.4");
}

#[tokio::test]
async fn test_dashboard_system_info() {
    let (state, _cache) = default_app_state().await;

    let (_, body) = get_json(create_router(state), "/dashboard").await;

    let system = &body["system"];
    assert_eq!(system["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(system["platform"], std::env::consts::OS);
    assert_eq!(system["arch"], std::env::consts::ARCH);
    assert_eq!(system["pid"], std::process::id());
    assert_eq!(system["memory"]["unit"], "MB");
    let used = system["memory"]["used"].as_u64().unwrap();
    let total = system["memory"]["total"].as_u64().unwrap();
    assert!(used <= total);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_dashboard_embeds_dependency_errors() {
    let (state, cache) = default_app_state().await;
    cache.set_down(true);
    state.db.clone().close().await.unwrap();

    let (status, body) = get_json(create_router(state), "/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    let services = &body["services"];
    assert_eq!(services["api"]["status"], "healthy");
    assert_eq!(services["database"]["status"], "unhealthy");
    assert!(services["database"]["error"].is_string());
    assert!(services["database"].get("version").is_none());
    assert_eq!(services["redis"]["status"], "unhealthy");
    assert!(services["redis"]["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}
