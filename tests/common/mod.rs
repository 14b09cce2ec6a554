//! Test helpers and fakes shared by the integration tests.
//!
//! The API is driven against an in-memory SQLite database, an in-memory cache
//! and a scripted container runtime. Sibling HTTP services (backend health,
//! frontend dev server) are played by local axum servers on ephemeral ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

use wander::config::Config;
use wander::services::cache::{CacheError, CacheResult, CacheStore};
use wander::services::docker::{ContainerRuntime, ContainerState};
use wander::state::{AppState, DashboardState};

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

// ============================================================================
// Cache fake
// ============================================================================

/// In-memory cache that can be switched off to simulate an outage
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Duration)>>,
    down: AtomicBool,
    redis_version: Option<String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            redis_version: Some("7.2.4".to_string()),
            ..Default::default()
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Expiry recorded for `key` by the last SET
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    fn check(&self) -> CacheResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn ping(&self) -> CacheResult<()> {
        self.check()
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl));
        Ok(())
    }

    async fn info(&self, _section: &str) -> CacheResult<String> {
        self.check()?;
        let version = self.redis_version.clone().unwrap_or_default();
        Ok(format!(
            "# Server\r\nredis_version:{}\r\nredis_mode:standalone\r\n",
            version
        ))
    }
}

// ============================================================================
// Container runtime fake
// ============================================================================

/// Container runtime answering from fixed tables
#[derive(Default)]
pub struct ScriptedRuntime {
    containers: HashMap<String, ContainerState>,
    exec_output: HashMap<String, String>,
    version: Option<String>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, name: &str, state: ContainerState) -> Self {
        self.containers.insert(name.to_string(), state);
        self
    }

    /// Output of any command run inside `name`
    pub fn with_exec(mut self, name: &str, output: &str) -> Self {
        self.exec_output.insert(name.to_string(), output.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn inspect(&self, name: &str) -> ContainerState {
        self.containers
            .get(name)
            .cloned()
            .unwrap_or(ContainerState::NotFound)
    }

    async fn exec(&self, name: &str, _cmd: &[&str]) -> Option<String> {
        self.exec_output.get(name).cloned()
    }

    async fn version(&self) -> Option<String> {
        self.version.clone()
    }
}

// ============================================================================
// Sibling services
// ============================================================================

/// Serve `router` on an ephemeral local port; returns its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A server answering 200 on every path
pub async fn spawn_ok_server() -> String {
    spawn_server(Router::new().fallback(|| async { "OK" })).await
}

/// Bind then drop a listener so the port is very likely closed
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ============================================================================
// State builders
// ============================================================================

/// Config whose probe targets point at `backend` and `frontend`
pub fn test_config(backend: &str, frontend: &str) -> Config {
    let mut config = Config::from_env();
    config.setup.container_prefix = "wander".to_string();
    config.setup.public_host = "localhost".to_string();
    config.setup.backend_health_url = format!("{}/health", backend);
    config.setup.api_status_url = format!("{}/api/status", backend);
    config.setup.frontend_urls = vec![frontend.to_string()];
    config.setup.http_timeout = Duration::from_secs(2);
    config
}

pub fn build_app_state(
    db: DatabaseConnection,
    cache: Arc<MemoryCache>,
    runtime: ScriptedRuntime,
    config: Config,
) -> AppState {
    AppState::new(Arc::new(config), db, cache, Arc::new(runtime))
}

/// State with healthy dependencies and no sibling services
pub async fn default_app_state() -> (AppState, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let closed = closed_url().await;
    let state = build_app_state(
        create_test_db().await,
        cache.clone(),
        ScriptedRuntime::new(),
        test_config(&closed, &closed),
    );
    (state, cache)
}

pub fn build_dashboard_state(runtime: ScriptedRuntime, config: Config) -> DashboardState {
    DashboardState::new(Arc::new(config), Arc::new(runtime))
}

// ============================================================================
// Request helpers
// ============================================================================

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::json!({}));
    (status, body)
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
