//! Source retrieval over HTTP or from the local filesystem.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{IngestionError, Result};

/// HTTP client settings for source fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: concat!("aqhi-mapper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// True for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetches source documents from URLs or local paths.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| IngestionError::fetch("http client", e))?;

        Ok(Self { client })
    }

    /// Fetch the raw bytes at `location`.
    #[instrument(skip(self))]
    pub async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let bytes = if is_remote(location) {
            self.fetch_http(location).await?
        } else {
            debug!("Reading local source");
            tokio::fs::read(location)
                .await
                .map_err(|e| IngestionError::fetch(location, e))?
        };

        info!(size = bytes.len(), "Fetched source");
        Ok(bytes)
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestionError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestionError::fetch(url, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IngestionError::fetch(url, e))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/data.csv"));
        assert!(is_remote("HTTP://example.org/data.csv"));
        assert!(!is_remote("/data/stations.csv"));
        assert!(!is_remote("boundaries/edmonton.geojson"));
    }

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_secs, 60);
        assert!(config.user_agent.starts_with("aqhi-mapper/"));
    }
}
