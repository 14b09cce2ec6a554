use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::env_parse;

/// Targets and limits used by the setup-progress probes
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Container name prefix; containers are `<prefix>-postgres`, `<prefix>-redis`, ...
    pub container_prefix: String,
    /// Host name used in the endpoint list shown to the developer
    pub public_host: String,
    pub api_port: u16,
    pub frontend_port: u16,
    pub backend_health_url: String,
    pub api_status_url: String,
    /// Tried in order; the frontend is reachable if any of them answers
    pub frontend_urls: Vec<String>,
    pub backend_manifest: PathBuf,
    pub frontend_manifest: PathBuf,
    pub http_timeout: Duration,
    pub exec_timeout: Duration,
}

impl SetupConfig {
    pub fn from_env(api_port: u16) -> Self {
        let frontend_port = env_parse("FRONTEND_PORT", 3000);

        let frontend_urls = env::var("WANDER_FRONTEND_URLS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    format!("http://frontend:{}", frontend_port),
                    format!("http://localhost:{}", frontend_port),
                ]
            });

        Self {
            container_prefix: env::var("WANDER_CONTAINER_PREFIX")
                .unwrap_or_else(|_| "wander".to_string()),
            public_host: env::var("WANDER_PUBLIC_HOST").unwrap_or_else(|_| "localhost".to_string()),
            api_port,
            frontend_port,
            backend_health_url: env::var("WANDER_BACKEND_HEALTH_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/health", api_port)),
            api_status_url: env::var("WANDER_API_STATUS_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/api/status", api_port)),
            frontend_urls,
            backend_manifest: PathBuf::from(
                env::var("WANDER_BACKEND_MANIFEST").unwrap_or_else(|_| "Cargo.toml".to_string()),
            ),
            frontend_manifest: PathBuf::from(
                env::var("WANDER_FRONTEND_MANIFEST")
                    .unwrap_or_else(|_| "../frontend/package.json".to_string()),
            ),
            http_timeout: Duration::from_secs(3),
            exec_timeout: Duration::from_secs(env_parse("WANDER_EXEC_TIMEOUT_SECS", 10)),
        }
    }

    pub fn container_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.container_prefix, suffix)
    }

    /// Base URL of the API as seen from the developer's machine
    pub fn public_api_url(&self) -> String {
        format!("http://{}:{}", self.public_host, self.api_port)
    }

    pub fn public_frontend_url(&self) -> String {
        format!("http://{}:{}", self.public_host, self.frontend_port)
    }
}
