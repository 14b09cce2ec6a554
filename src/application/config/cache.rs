use std::env;
use std::time::Duration;

use super::env_parse;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a single cache command (`REDIS_TIMEOUT_MS`)
    pub command_timeout: Duration,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("REDIS_HOST").unwrap_or_else(|_| "redis".to_string()),
            port: env_parse("REDIS_PORT", 6379),
            command_timeout: Duration::from_millis(env_parse("REDIS_TIMEOUT_MS", 2000)),
        }
    }

    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }

    pub fn public_connection_string(&self, public_host: &str) -> String {
        format!("redis://{}:{}", public_host, self.port)
    }
}
