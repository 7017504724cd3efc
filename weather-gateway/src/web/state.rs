//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{CachedReferenceSource, StationCache};
use crate::config::{GatewayConfig, StalePolicy};
use crate::upstream::{
    FetchError, OpenMeteoClient, ReferenceSource, StationClient, StationSource,
};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached upstream station list
    pub stations: Arc<StationCache>,

    /// Reference temperature source (possibly cached)
    pub reference: Arc<dyn ReferenceSource>,

    /// Maximum plausible deviation from the reference temperature (°C)
    pub temp_tolerance_c: f64,

    /// What to do when the station list cannot be refreshed
    pub stale_policy: StalePolicy,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        stations: StationCache,
        reference: Arc<dyn ReferenceSource>,
        temp_tolerance_c: f64,
        stale_policy: StalePolicy,
    ) -> Self {
        Self {
            stations: Arc::new(stations),
            reference,
            temp_tolerance_c,
            stale_policy,
        }
    }

    /// Build the HTTP clients and caches described by `config`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, FetchError> {
        let station_client: Arc<dyn StationSource> =
            Arc::new(StationClient::new(config.station_client_config())?);
        let stations = StationCache::new(station_client, &config.station_cache_config());

        let open_meteo: Arc<dyn ReferenceSource> =
            Arc::new(OpenMeteoClient::new(config.open_meteo_config())?);
        let reference: Arc<dyn ReferenceSource> = match config.reference_cache_config() {
            Some(cache_config) => Arc::new(CachedReferenceSource::new(open_meteo, &cache_config)),
            None => open_meteo,
        };

        Ok(Self::new(
            stations,
            reference,
            config.temp_tolerance_c,
            config.stale_policy,
        ))
    }
}
