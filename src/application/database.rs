use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

use crate::config::database::DatabaseConfig;
use crate::error::{AppError, Result};

pub type DbConn = DatabaseConnection;

/// Open the connection pool described by `config`
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn> {
    tracing::info!(
        "Connecting to PostgreSQL at {}:{}/{}...",
        config.host,
        config.port,
        config.database
    );

    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))?;

    ping(&db).await?;

    Ok(db)
}

/// Trivial round trip (`SELECT 1`)
pub async fn ping(db: &DbConn) -> Result<()> {
    let backend = db.get_database_backend();
    db.query_one(Statement::from_string(backend, "SELECT 1"))
        .await?;
    Ok(())
}

/// Server clock and version string as reported by the database
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServerInfo {
    pub current_time: String,
    pub pg_version: String,
}

pub async fn server_info(db: &DbConn) -> Result<ServerInfo> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DbBackend::Sqlite => {
            "SELECT datetime('now') AS \"current_time\", 'SQLite ' || sqlite_version() AS pg_version"
        }
        _ => "SELECT NOW()::text AS \"current_time\", version() AS pg_version",
    };

    let row = db
        .query_one(Statement::from_string(backend, sql))
        .await?
        .ok_or_else(|| AppError::Internal("Database returned no rows".to_string()))?;

    Ok(ServerInfo {
        current_time: row.try_get("", "current_time")?,
        pg_version: row.try_get("", "pg_version")?,
    })
}

/// First two words of a version banner, e.g. `PostgreSQL 15.4`
pub fn short_version(banner: &str) -> String {
    banner
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}
