//! Test helpers for unit tests inside the crate.
//!
//! Integration tests under `tests/` carry their own fakes in `tests/common`.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};

use crate::services::cache::{CacheError, CacheResult, CacheStore};

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Cache that is never reachable
pub struct NullCache;

#[async_trait]
impl CacheStore for NullCache {
    async fn ping(&self) -> CacheResult<()> {
        Err(CacheError::Unavailable("null cache".to_string()))
    }

    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Unavailable("null cache".to_string()))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Unavailable("null cache".to_string()))
    }

    async fn info(&self, _section: &str) -> CacheResult<String> {
        Err(CacheError::Unavailable("null cache".to_string()))
    }
}
