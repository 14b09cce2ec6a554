use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::{ProcessesToUpdate, System};

use crate::db;
use crate::services::cache::{parse_redis_version, CacheStore};
use crate::state::AppState;

pub fn dashboard_routes(state: AppState) -> Router {
    Router::new().route("/", get(dashboard)).with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ApiService {
    pub status: &'static str,
    pub uptime: f64,
}

/// A dependency entry: version details when reachable, the error otherwise
#[derive(Debug, Default, Serialize)]
pub struct DependencyService {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyService {
    fn unhealthy(error: impl std::fmt::Display) -> Self {
        Self {
            status: "unhealthy",
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardServices {
    pub api: ApiService,
    pub database: DependencyService,
    pub redis: DependencyService,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub version: &'static str,
    pub platform: &'static str,
    pub arch: &'static str,
    pub pid: u32,
    pub memory: MemoryInfo,
}

/// Resident memory of this process against the host's total, in megabytes
#[derive(Debug, Serialize)]
pub struct MemoryInfo {
    pub used: u64,
    pub total: u64,
    pub unit: &'static str,
}

const BYTES_PER_MB: u64 = 1024 * 1024;

fn memory_info() -> MemoryInfo {
    let mut sys = System::new();
    sys.refresh_memory();

    let used = match sysinfo::get_current_pid() {
        Ok(pid) => {
            sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            sys.process(pid).map(|p| p.memory()).unwrap_or(0)
        }
        Err(e) => {
            tracing::debug!("Cannot resolve own pid: {}", e);
            0
        }
    };

    MemoryInfo {
        used: used.div_ceil(BYTES_PER_MB),
        total: sys.total_memory() / BYTES_PER_MB,
        unit: "MB",
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub timestamp: DateTime<Utc>,
    pub services: DashboardServices,
    pub system: SystemInfo,
}

async fn database_service(db: &db::DbConn) -> DependencyService {
    match db::server_info(db).await {
        Ok(info) => DependencyService {
            status: "healthy",
            version: Some(db::short_version(&info.pg_version)),
            time: Some(info.current_time),
            error: None,
        },
        Err(e) => DependencyService::unhealthy(e),
    }
}

async fn redis_service(cache: &dyn CacheStore) -> DependencyService {
    if let Err(e) = cache.ping().await {
        return DependencyService::unhealthy(e);
    }

    match cache.info("server").await {
        Ok(info) => DependencyService {
            status: "healthy",
            version: Some(parse_redis_version(&info).unwrap_or_else(|| "unknown".to_string())),
            ..Default::default()
        },
        Err(e) => DependencyService::unhealthy(e),
    }
}

// GET /dashboard
async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let (database, redis) = tokio::join!(
        database_service(&state.db),
        redis_service(state.cache.as_ref()),
    );

    Json(DashboardResponse {
        timestamp: Utc::now(),
        services: DashboardServices {
            api: ApiService {
                status: "healthy",
                uptime: state.uptime_secs(),
            },
            database,
            redis,
        },
        system: SystemInfo {
            version: env!("CARGO_PKG_VERSION"),
            platform: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            pid: std::process::id(),
            memory: memory_info(),
        },
    })
}
