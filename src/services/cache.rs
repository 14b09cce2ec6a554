//! Redis-backed cache client.
//!
//! Handlers talk to the cache through [`CacheStore`] so the in-memory fake used
//! by the test suite and the real [`RedisCache`] are interchangeable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use thiserror::Error;

use crate::config::cache::CacheConfig;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Minimal key/value surface the API needs from the cache
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn ping(&self) -> CacheResult<()>;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Raw `INFO <section>` text
    async fn info(&self, section: &str) -> CacheResult<String>;
}

pub type SharedCache = Arc<dyn CacheStore>;

/// Redis client over a multiplexed, auto-reconnecting connection
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisCache {
    /// Connect and verify the server answers `PING`
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        tracing::info!("Connecting to Redis at {}:{}...", config.host, config.port);

        let client = redis::Client::open(config.url())?;
        let conn = tokio::time::timeout(config.command_timeout, client.get_connection_manager())
            .await
            .map_err(|_| CacheError::Timeout(config.command_timeout))??;

        let cache = Self {
            conn,
            timeout: config.command_timeout,
        };
        cache.ping().await?;

        Ok(cache)
    }

    async fn run<T>(&self, cmd: redis::Cmd) -> CacheResult<T>
    where
        T: redis::FromRedisValue,
    {
        let mut conn = self.conn.clone();
        let value: T = tokio::time::timeout(self.timeout, cmd.query_async(&mut conn))
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))??;
        Ok(value)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn ping(&self) -> CacheResult<()> {
        let reply: String = self.run(redis::cmd("PING")).await?;
        if reply.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(CacheError::Unavailable(format!(
                "unexpected PING reply: {}",
                reply
            )))
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.run(cmd).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("EX").arg(ttl.as_secs().max(1));
        let _: () = self.run(cmd).await?;
        Ok(())
    }

    async fn info(&self, section: &str) -> CacheResult<String> {
        let mut cmd = redis::cmd("INFO");
        cmd.arg(section);
        self.run(cmd).await
    }
}

/// Pull `redis_version` out of an `INFO server` reply
pub fn parse_redis_version(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("redis_version:"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
