use std::sync::Arc;
use std::time::Instant;

use crate::application::config::Config;
use crate::application::database::DbConn;
use crate::services::cache::SharedCache;
use crate::services::docker::SharedRuntime;
use crate::services::probe::HttpProbe;
use crate::services::readiness::InProcessReadiness;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DbConn,
    pub cache: SharedCache,
    pub runtime: SharedRuntime,
    pub http: HttpProbe,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: DbConn, cache: SharedCache, runtime: SharedRuntime) -> Self {
        let http = HttpProbe::new(config.setup.http_timeout);

        Self {
            config,
            db,
            cache,
            runtime,
            http,
            started_at: Instant::now(),
        }
    }

    /// Seconds since the state was built (process uptime in practice)
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn readiness(&self) -> InProcessReadiness<'_> {
        InProcessReadiness {
            config: &self.config,
            db: &self.db,
            cache: self.cache.as_ref(),
            http: &self.http,
            runtime: self.runtime.as_ref(),
        }
    }
}

/// State of the host-side dashboard: no database or cache clients
#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<Config>,
    pub runtime: SharedRuntime,
    pub http: HttpProbe,
}

impl DashboardState {
    pub fn new(config: Arc<Config>, runtime: SharedRuntime) -> Self {
        let http = HttpProbe::new(config.setup.http_timeout);
        Self {
            config,
            runtime,
            http,
        }
    }
}
