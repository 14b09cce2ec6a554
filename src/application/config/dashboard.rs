use std::env;

use super::env_parse;

/// Host-side dashboard process settings
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("DASHBOARD_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env_parse("DASHBOARD_PORT", 8081),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
