//! Sensor network node list client.

use std::time::Duration;

use axum::body::Bytes;
use futures::future::BoxFuture;
use tracing::debug;

use super::error::FetchError;

/// Default node list endpoint.
const DEFAULT_URL: &str = "https://api.bolte.lol/nodes";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest upstream error body passed on in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Source of the raw station list.
///
/// Returns the upstream response body untouched so it can be both parsed
/// and proxied byte-for-byte.
pub trait StationSource: Send + Sync {
    fn fetch_stations(&self) -> BoxFuture<'_, Result<Bytes, FetchError>>;
}

/// Configuration for the node list client.
#[derive(Debug, Clone)]
pub struct StationClientConfig {
    /// Full URL of the node list
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StationClientConfig {
    /// Create a new config for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for StationClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// HTTP client for the node list.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: reqwest::Client,
    url: String,
}

impl StationClient {
    /// Create a new node list client.
    pub fn new(config: StationClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    /// Fetch the full node list.
    pub async fn fetch_all(&self) -> Result<Bytes, FetchError> {
        debug!(url = %self.url, "fetching station list");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::from_request(&self.url, e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::from_request(&self.url, e))
    }
}

impl StationSource for StationClient {
    fn fetch_stations(&self) -> BoxFuture<'_, Result<Bytes, FetchError>> {
        Box::pin(self.fetch_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = StationClientConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_with_timeout() {
        let config = StationClientConfig::new("http://localhost:8080/nodes").with_timeout(3);
        assert_eq!(config.url, "http://localhost:8080/nodes");
        assert_eq!(config.timeout_secs, 3);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_error() {
        // Reserve a port, then release it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            StationClient::new(StationClientConfig::new(format!("http://{addr}/nodes"))).unwrap();
        let result = client.fetch_stations().await;

        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
