//! Open-Meteo reference temperature client.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use super::error::FetchError;

/// Default Open-Meteo forecast endpoint.
const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest upstream error body passed on in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Source of an independent current temperature for a coordinate.
///
/// `Ok(None)` means the source answered but had no temperature; that is
/// not a failure.
pub trait ReferenceSource: Send + Sync {
    fn fetch_reference_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> BoxFuture<'_, Result<Option<f64>, FetchError>>;
}

/// Response from the forecast endpoint. Only the fields we read.
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    temperature_2m: Option<f64>,
}

/// Configuration for the Open-Meteo client.
#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    /// Forecast endpoint URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenMeteoConfig {
    /// Set a custom endpoint (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Open-Meteo API client.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a new Open-Meteo client.
    pub fn new(config: OpenMeteoConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch the current 2 m temperature (°C) at a coordinate.
    pub async fn current_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<f64>, FetchError> {
        debug!(latitude, longitude, "fetching reference temperature");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m".to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::from_request(&self.base_url, e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_request(&self.base_url, e))?;

        parse_current_temperature(&body)
    }
}

impl ReferenceSource for OpenMeteoClient {
    fn fetch_reference_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> BoxFuture<'_, Result<Option<f64>, FetchError>> {
        Box::pin(self.current_temperature(latitude, longitude))
    }
}

/// Extract `current.temperature_2m` from a forecast response body.
fn parse_current_temperature(body: &[u8]) -> Result<Option<f64>, FetchError> {
    let response: ForecastResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Json {
            message: e.to_string(),
        })?;

    Ok(response
        .current
        .and_then(|c| c.temperature_2m)
        .filter(|t| t.is_finite()))
}
