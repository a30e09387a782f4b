//! Where monster payloads come from
//!
//! [`MonsterSource`] is the seam between the selection algorithm and the
//! network. [`ApiClient`] is the production implementation over the SRD REST
//! API; tests drive the fetcher with in-memory sources.

use super::normalize::{ApiMonster, MonsterList, MonsterRef};
use crate::config::{FetchConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::fetch_with_retry;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

/// A list-and-detail source of monster payloads
#[async_trait]
pub trait MonsterSource: Send + Sync {
    /// All available monsters, in source order
    async fn list(&self) -> Result<Vec<MonsterRef>>;

    /// Full payload of one monster
    async fn detail(&self, index: &str) -> Result<ApiMonster>;
}

/// HTTP client for the SRD API
///
/// Endpoints:
/// - `GET {base}/monsters` → `{ "count": n, "results": [{ "index", "name", "url" }] }`
/// - `GET {base}/monsters/{index}` → the full monster payload
pub struct ApiClient {
    http_client: reqwest::Client,
    base: String,
    retry: RetryConfig,
}

impl ApiClient {
    /// Build a client from the fetch configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base: config.api_base.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
        })
    }

    /// Base URL requests are made against
    pub fn base(&self) -> &str {
        &self.base
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        fetch_with_retry(&self.retry, move || self.get_once(url)).await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self.http_client.get(url).send().await?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl MonsterSource for ApiClient {
    async fn list(&self) -> Result<Vec<MonsterRef>> {
        let url = format!("{}/monsters", self.base);
        let list: MonsterList = self.get_json(&url).await?;
        Ok(list.results)
    }

    async fn detail(&self, index: &str) -> Result<ApiMonster> {
        let url = format!("{}/monsters/{}", self.base, index);
        self.get_json(&url).await
    }
}
