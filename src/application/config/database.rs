use std::env;
use std::time::Duration;

use super::env_parse;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Full connection URL; `DATABASE_URL` wins over the individual parts
    pub database_url: String,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "postgres".to_string());
        let port = env_parse("POSTGRES_PORT", 5432);
        let user = env::var("POSTGRES_USER").unwrap_or_else(|_| "wander".to_string());
        let password =
            env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "dev_password_123".to_string());
        let database = env::var("POSTGRES_DB").unwrap_or_else(|_| "wander_dev".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, database)
        });

        Self {
            host,
            port,
            user,
            password,
            database,
            database_url,
            max_connections: 20,
            idle_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Connection string as seen from the developer's machine
    pub fn public_connection_string(&self, public_host: &str) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, public_host, self.port, self.database
        )
    }
}
