//! Gateway configuration.
//!
//! Every setting has a default and can be overridden from the environment:
//!
//! | Variable                   | Default                                  |
//! |----------------------------|------------------------------------------|
//! | `GATEWAY_ADDR`             | `0.0.0.0:8080`                           |
//! | `STATIONS_URL`             | `https://api.bolte.lol/nodes`            |
//! | `REFERENCE_URL`            | `https://api.open-meteo.com/v1/forecast` |
//! | `FETCH_TIMEOUT_SECS`       | `10`                                     |
//! | `CACHE_TTL_SECS`           | `300`                                    |
//! | `REFERENCE_CACHE_TTL_SECS` | `60` (`0` disables the cache)            |
//! | `TEMP_TOLERANCE_C`         | `2.0`                                    |
//! | `STALE_POLICY`             | `fail` (or `serve-stale`)                |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{ReferenceCacheConfig, StationCacheConfig};
use crate::selector::DEFAULT_TEMP_TOLERANCE_C;
use crate::upstream::{OpenMeteoConfig, StationClientConfig};

/// Error returned when an environment variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name}: {value:?} ({reason})")]
pub struct ConfigError {
    name: &'static str,
    value: String,
    reason: &'static str,
}

/// What to do when the station list cannot be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Fail the request.
    #[default]
    Fail,
    /// Serve the expired list, if there is one.
    ServeStale,
}

impl FromStr for StalePolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(StalePolicy::Fail),
            "serve-stale" | "serve_stale" => Ok(StalePolicy::ServeStale),
            _ => Err("expected \"fail\" or \"serve-stale\""),
        }
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Upstream station list endpoint.
    pub stations_url: String,

    /// Open-Meteo forecast endpoint.
    pub reference_url: String,

    /// Timeout for every upstream request.
    pub fetch_timeout_secs: u64,

    /// How long a fetched station list is served.
    pub cache_ttl: Duration,

    /// How long a reference reading is reused. Zero disables caching.
    pub reference_cache_ttl: Duration,

    /// Maximum plausible deviation from the reference temperature (°C).
    pub temp_tolerance_c: f64,

    /// Behavior when refreshing the station list fails.
    pub stale_policy: StalePolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            stations_url: StationClientConfig::default().url,
            reference_url: OpenMeteoConfig::default().base_url,
            fetch_timeout_secs: 10,
            cache_ttl: StationCacheConfig::default().ttl,
            reference_cache_ttl: ReferenceCacheConfig::default().ttl,
            temp_tolerance_c: DEFAULT_TEMP_TOLERANCE_C,
            stale_policy: StalePolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_ADDR") {
            config.bind_addr = parse("GATEWAY_ADDR", &v, "expected host:port")?;
        }
        if let Some(v) = lookup("STATIONS_URL") {
            config.stations_url = non_empty("STATIONS_URL", v)?;
        }
        if let Some(v) = lookup("REFERENCE_URL") {
            config.reference_url = non_empty("REFERENCE_URL", v)?;
        }
        if let Some(v) = lookup("FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = parse("FETCH_TIMEOUT_SECS", &v, "expected seconds")?;
            if config.fetch_timeout_secs == 0 {
                return Err(ConfigError {
                    name: "FETCH_TIMEOUT_SECS",
                    value: v,
                    reason: "must be at least 1",
                });
            }
        }
        if let Some(v) = lookup("CACHE_TTL_SECS") {
            config.cache_ttl =
                Duration::from_secs(parse("CACHE_TTL_SECS", &v, "expected seconds")?);
        }
        if let Some(v) = lookup("REFERENCE_CACHE_TTL_SECS") {
            config.reference_cache_ttl = Duration::from_secs(parse(
                "REFERENCE_CACHE_TTL_SECS",
                &v,
                "expected seconds",
            )?);
        }
        if let Some(v) = lookup("TEMP_TOLERANCE_C") {
            let tolerance: f64 = parse("TEMP_TOLERANCE_C", &v, "expected a number")?;
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(ConfigError {
                    name: "TEMP_TOLERANCE_C",
                    value: v,
                    reason: "must be a non-negative number",
                });
            }
            config.temp_tolerance_c = tolerance;
        }
        if let Some(v) = lookup("STALE_POLICY") {
            config.stale_policy = v.parse().map_err(|reason| ConfigError {
                name: "STALE_POLICY",
                value: v.clone(),
                reason,
            })?;
        }

        Ok(config)
    }

    /// Node list client settings.
    pub fn station_client_config(&self) -> StationClientConfig {
        StationClientConfig::new(&self.stations_url).with_timeout(self.fetch_timeout_secs)
    }

    /// Open-Meteo client settings.
    pub fn open_meteo_config(&self) -> OpenMeteoConfig {
        OpenMeteoConfig::default()
            .with_base_url(&self.reference_url)
            .with_timeout(self.fetch_timeout_secs)
    }

    /// Station cache settings.
    pub fn station_cache_config(&self) -> StationCacheConfig {
        StationCacheConfig::default().with_ttl(self.cache_ttl)
    }

    /// Reference cache settings, or `None` when reference caching is off.
    pub fn reference_cache_config(&self) -> Option<ReferenceCacheConfig> {
        if self.reference_cache_ttl.is_zero() {
            return None;
        }
        Some(ReferenceCacheConfig {
            ttl: self.reference_cache_ttl,
            ..ReferenceCacheConfig::default()
        })
    }
}

fn parse<T: FromStr>(
    name: &'static str,
    value: &str,
    reason: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError {
        name,
        value: value.to_string(),
        reason,
    })
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError {
            name,
            value,
            reason: "must not be empty",
        });
    }
    Ok(value)
}
