pub mod cache;
pub mod dashboard;
pub mod database;
pub mod server;
pub mod setup;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub cache: cache::CacheConfig,
    pub dashboard: dashboard::DashboardConfig,
    pub setup: setup::SetupConfig,

    // Build info
    pub version: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let server = server::ServerConfig::from_env();
        let setup = setup::SetupConfig::from_env(server.port);

        Self {
            server,
            database: database::DatabaseConfig::from_env(),
            cache: cache::CacheConfig::from_env(),
            dashboard: dashboard::DashboardConfig::from_env(),
            setup,

            version: env!("CARGO_PKG_VERSION").to_string(),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// Parse a numeric environment variable, falling back to `default` when unset or invalid
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_falls_back_on_missing_var() {
        let value: u16 = env_parse("WANDER_TEST_SURELY_UNSET_VAR", 4242);
        assert_eq!(value, 4242);
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        env::set_var("WANDER_TEST_GARBAGE_PORT", "not-a-port");
        let value: u16 = env_parse("WANDER_TEST_GARBAGE_PORT", 8080);
        assert_eq!(value, 8080);
        env::remove_var("WANDER_TEST_GARBAGE_PORT");
    }

    #[test]
    fn test_env_parse_reads_value() {
        env::set_var("WANDER_TEST_GOOD_PORT", " 9000 ");
        let value: u16 = env_parse("WANDER_TEST_GOOD_PORT", 8080);
        assert_eq!(value, 9000);
        env::remove_var("WANDER_TEST_GOOD_PORT");
    }

    #[test]
    fn test_config_version_matches_crate() {
        let config = Config::from_env();
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
    }
}
