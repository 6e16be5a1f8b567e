//! HTTP transport for the SensorThings API
//!
//! Everything above this layer talks to a [`Fetch`] so the traversal can be
//! driven by canned responses in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::config::ApiConfig;
use crate::{Result, SamenMetenError};

/// Source of JSON documents addressed by absolute URL
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `url` and decode the body as JSON. Non-2xx statuses are errors.
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// GET `url` and decode the body as `T`
pub async fn fetch_json<T: DeserializeOwned>(fetch: &dyn Fetch, url: &str) -> Result<T> {
    let value = fetch.get_json(url).await?;
    serde_json::from_value(value)
        .map_err(|e| SamenMetenError::decode(format!("Unexpected payload from {url}: {e}")))
}

/// [`Fetch`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new client with the configured timeout and user agent
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SamenMetenError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(name = "http_get", level = "debug", skip(self))]
    async fn get_json(&self, url: &str) -> Result<Value> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SamenMetenError::network(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP {} from {}", status, url);
            return Err(SamenMetenError::status(status.as_u16(), url));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SamenMetenError::decode(format!("Invalid JSON from {url}: {e}")))?;

        let elapsed = start_time.elapsed();
        debug!("HTTP {} in {:.3}s", status, elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow API response from {}: {:.3}s", url, elapsed.as_secs_f64());
        }

        Ok(body)
    }
}
