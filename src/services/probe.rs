//! Reachability probes.
//!
//! Every probe answers a plain `bool`: failures, timeouts and malformed targets
//! all collapse to "unreachable" and are only logged.

use std::time::Duration;

use reqwest::Client;

use crate::db::{self, DbConn};
use crate::services::cache::CacheStore;

/// HTTP liveness probe for sibling services
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    #[allow(clippy::expect_used)]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .timeout(timeout)
                .connect_timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// `GET url`; any HTTP response (including 4xx/5xx) means the server is up
    pub async fn is_reachable(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                tracing::debug!("Probe {} answered {}", url, response.status());
                true
            }
            Err(e) => {
                tracing::debug!("Probe {} failed: {}", url, e);
                false
            }
        }
    }

    /// True if any of `urls` answers; tried in order
    pub async fn any_reachable(&self, urls: &[String]) -> bool {
        for url in urls {
            if self.is_reachable(url).await {
                return true;
            }
        }
        false
    }
}

pub async fn database_reachable(db: &DbConn) -> bool {
    match db::ping(db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Database probe failed: {}", e);
            false
        }
    }
}

pub async fn cache_reachable(cache: &dyn CacheStore) -> bool {
    match cache.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Cache probe failed: {}", e);
            false
        }
    }
}
