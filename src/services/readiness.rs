//! Setup readiness aggregation.
//!
//! Each of the four services of the development stack is run through a fixed
//! chain of probes and mapped onto a [`ServiceProgress`]. The chain differs by
//! vantage point:
//!
//! - **in-process** (the API itself): protocol ping or HTTP probe first, the
//!   container runtime only explains *why* the service is down;
//! - **host** (the auxiliary dashboard): the container runtime first, then
//!   `docker exec` / HTTP to confirm the service answers.
//!
//! Nothing is cached; every call re-probes everything.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::config::Config;
use crate::db::DbConn;
use crate::services::cache::CacheStore;
use crate::services::docker::{ContainerRuntime, ContainerState};
use crate::services::probe::{self, HttpProbe};

/// Per-service setup status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupStatus {
    Pending,
    Installing,
    Starting,
    Healthy,
    Unhealthy,
    Error,
}

/// The services tracked by the setup dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Database,
    Cache,
    Backend,
    Frontend,
}

impl ServiceKind {
    pub fn all() -> [ServiceKind; 4] {
        [
            ServiceKind::Database,
            ServiceKind::Cache,
            ServiceKind::Backend,
            ServiceKind::Frontend,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::Database => "PostgreSQL Database",
            ServiceKind::Cache => "Redis Cache",
            ServiceKind::Backend => "Backend API",
            ServiceKind::Frontend => "Frontend",
        }
    }

    pub fn container_suffix(&self) -> &'static str {
        match self {
            ServiceKind::Database => "postgres",
            ServiceKind::Cache => "redis",
            ServiceKind::Backend => "backend",
            ServiceKind::Frontend => "frontend",
        }
    }

    /// Progress estimate while the container runs but the service does not answer yet
    pub fn starting_progress(&self) -> u8 {
        match self {
            ServiceKind::Database | ServiceKind::Cache => 50,
            ServiceKind::Backend => 70,
            ServiceKind::Frontend => 85,
        }
    }

    fn starting_message(&self) -> &'static str {
        match self {
            ServiceKind::Database => "Waiting for database connection...",
            ServiceKind::Cache => "Waiting for Redis connection...",
            ServiceKind::Backend => "Backend starting up...",
            ServiceKind::Frontend => "Frontend container running, waiting for Vite to respond...",
        }
    }

    fn healthy_message(&self) -> &'static str {
        match self {
            ServiceKind::Database => "Database connected and responding",
            ServiceKind::Cache => "Redis connected and responding",
            ServiceKind::Backend => "API is responding",
            ServiceKind::Frontend => "Frontend is accessible (Vite dev server active)",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProgress {
    pub name: String,
    pub status: SetupStatus,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl ServiceProgress {
    fn new(
        kind: ServiceKind,
        container_name: &str,
        status: SetupStatus,
        progress: u8,
        message: &str,
    ) -> Self {
        Self {
            name: kind.display_name().to_string(),
            status,
            progress,
            message: message.to_string(),
            container_name: Some(container_name.to_string()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == SetupStatus::Healthy
    }
}

/// Decision table shared by both chains.
///
/// `answering` is the service-level signal (SQL/cache ping, HTTP, exec);
/// `container` is consulted only when the service does not answer.
pub fn classify(
    kind: ServiceKind,
    container_name: &str,
    answering: bool,
    container: ContainerState,
) -> ServiceProgress {
    if answering {
        return ServiceProgress::new(
            kind,
            container_name,
            SetupStatus::Healthy,
            100,
            kind.healthy_message(),
        );
    }

    match container {
        ContainerState::NotFound => ServiceProgress::new(
            kind,
            container_name,
            SetupStatus::Error,
            0,
            "Container not found (may have been removed)",
        ),
        ContainerState::Stopped => ServiceProgress::new(
            kind,
            container_name,
            SetupStatus::Unhealthy,
            0,
            "Container stopped",
        ),
        ContainerState::Running(_) | ContainerState::Unavailable => ServiceProgress::new(
            kind,
            container_name,
            SetupStatus::Starting,
            kind.starting_progress(),
            kind.starting_message(),
        ),
    }
}

/// `round(mean(progress))`, halves rounding up
pub fn overall_progress(services: &[ServiceProgress]) -> u8 {
    if services.is_empty() {
        return 0;
    }
    let sum: u32 = services.iter().map(|s| u32::from(s.progress)).sum();
    let mean = f64::from(sum) / services.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}

pub fn all_healthy(services: &[ServiceProgress]) -> bool {
    !services.is_empty() && services.iter().all(ServiceProgress::is_healthy)
}

// ============================================================================
// Endpoint descriptors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    Ready,
    Starting,
}

impl EndpointStatus {
    fn from_healthy(healthy: bool) -> Self {
        if healthy {
            EndpointStatus::Ready
        } else {
            EndpointStatus::Starting
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlEndpoint {
    pub url: String,
    pub description: String,
    pub status: EndpointStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseEndpoint {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub connection_string: String,
    pub description: String,
    pub status: EndpointStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEndpoint {
    pub host: String,
    pub port: String,
    pub connection_string: String,
    pub description: String,
    pub status: EndpointStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Endpoints {
    pub frontend: UrlEndpoint,
    pub backend: UrlEndpoint,
    pub database: DatabaseEndpoint,
    pub redis: CacheEndpoint,
    pub health: UrlEndpoint,
    pub api: UrlEndpoint,
    pub dashboard: UrlEndpoint,
}

impl Endpoints {
    pub fn build(config: &Config, services: &[ServiceProgress]) -> Self {
        let healthy = |kind: ServiceKind| {
            EndpointStatus::from_healthy(
                services
                    .iter()
                    .any(|s| s.name == kind.display_name() && s.is_healthy()),
            )
        };
        let backend = healthy(ServiceKind::Backend);
        let api_url = config.setup.public_api_url();
        let host = &config.setup.public_host;

        let url_endpoint = |url: String, description: &str, status| UrlEndpoint {
            url,
            description: description.to_string(),
            status,
        };

        Self {
            frontend: url_endpoint(
                config.setup.public_frontend_url(),
                "Frontend application",
                healthy(ServiceKind::Frontend),
            ),
            backend: url_endpoint(api_url.clone(), "Backend API", backend),
            database: DatabaseEndpoint {
                host: host.clone(),
                port: config.database.port.to_string(),
                database: config.database.database.clone(),
                user: config.database.user.clone(),
                connection_string: config.database.public_connection_string(host),
                description: "PostgreSQL database".to_string(),
                status: healthy(ServiceKind::Database),
            },
            redis: CacheEndpoint {
                host: host.clone(),
                port: config.cache.port.to_string(),
                connection_string: config.cache.public_connection_string(host),
                description: "Redis cache".to_string(),
                status: healthy(ServiceKind::Cache),
            },
            health: url_endpoint(
                format!("{}/health", api_url),
                "Health check endpoint",
                backend,
            ),
            api: url_endpoint(format!("{}/api", api_url), "API base endpoint", backend),
            dashboard: url_endpoint(
                format!("{}/dashboard", api_url),
                "API dashboard",
                backend,
            ),
        }
    }
}

/// Composite verdict returned by `/api/setup/progress`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupProgress {
    pub services: Vec<ServiceProgress>,
    pub overall_progress: u8,
    pub all_healthy: bool,
    pub endpoints: Endpoints,
    pub timestamp: DateTime<Utc>,
}

impl SetupProgress {
    pub fn from_services(config: &Config, services: Vec<ServiceProgress>) -> Self {
        Self {
            overall_progress: overall_progress(&services),
            all_healthy: all_healthy(&services),
            endpoints: Endpoints::build(config, &services),
            services,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Probe chains
// ============================================================================

/// Aggregator for the API process, which holds live database and cache clients
pub struct InProcessReadiness<'a> {
    pub config: &'a Config,
    pub db: &'a DbConn,
    pub cache: &'a dyn CacheStore,
    pub http: &'a HttpProbe,
    pub runtime: &'a dyn ContainerRuntime,
}

impl InProcessReadiness<'_> {
    pub async fn check(&self, kind: ServiceKind) -> ServiceProgress {
        let container_name = self.config.setup.container_name(kind.container_suffix());

        let answering = match kind {
            ServiceKind::Database => probe::database_reachable(self.db).await,
            ServiceKind::Cache => probe::cache_reachable(self.cache).await,
            ServiceKind::Backend => {
                self.http
                    .is_reachable(&self.config.setup.backend_health_url)
                    .await
            }
            ServiceKind::Frontend => self.http.any_reachable(&self.config.setup.frontend_urls).await,
        };

        if answering {
            return classify(kind, &container_name, true, ContainerState::Unavailable);
        }

        let container = self.runtime.inspect(&container_name).await;
        tracing::debug!("{} not answering, container state {:?}", container_name, container);
        classify(kind, &container_name, false, container)
    }

    pub async fn aggregate(&self) -> SetupProgress {
        let (database, cache, backend, frontend) = tokio::join!(
            self.check(ServiceKind::Database),
            self.check(ServiceKind::Cache),
            self.check(ServiceKind::Backend),
            self.check(ServiceKind::Frontend),
        );

        SetupProgress::from_services(self.config, vec![database, cache, backend, frontend])
    }
}

/// Aggregator for the host-side dashboard, which only sees containers and ports
pub struct HostReadiness<'a> {
    pub config: &'a Config,
    pub http: &'a HttpProbe,
    pub runtime: &'a dyn ContainerRuntime,
}

impl HostReadiness<'_> {
    async fn answering(&self, kind: ServiceKind, container_name: &str) -> bool {
        match kind {
            ServiceKind::Database => {
                let user = self.config.database.user.as_str();
                self.runtime
                    .exec(container_name, &["pg_isready", "-U", user])
                    .await
                    .is_some_and(|out| out.contains("accepting connections"))
            }
            ServiceKind::Cache => self
                .runtime
                .exec(container_name, &["redis-cli", "ping"])
                .await
                .is_some_and(|out| out.contains("PONG")),
            ServiceKind::Backend => {
                self.http
                    .is_reachable(&self.config.setup.backend_health_url)
                    .await
            }
            ServiceKind::Frontend => {
                self.http
                    .is_reachable(&self.config.setup.public_frontend_url())
                    .await
            }
        }
    }

    pub async fn check(&self, kind: ServiceKind) -> ServiceProgress {
        let container_name = self.config.setup.container_name(kind.container_suffix());
        let container = self.runtime.inspect(&container_name).await;

        match container {
            ContainerState::NotFound | ContainerState::Stopped => {
                classify(kind, &container_name, false, container)
            }
            ContainerState::Running(_) | ContainerState::Unavailable => {
                let answering = self.answering(kind, &container_name).await;
                classify(kind, &container_name, answering, container)
            }
        }
    }

    pub async fn aggregate(&self) -> SetupProgress {
        let (database, cache, backend, frontend) = tokio::join!(
            self.check(ServiceKind::Database),
            self.check(ServiceKind::Cache),
            self.check(ServiceKind::Backend),
            self.check(ServiceKind::Frontend),
        );

        SetupProgress::from_services(self.config, vec![database, cache, backend, frontend])
    }
}
