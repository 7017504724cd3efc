//! Caching layer for reference temperatures.
//!
//! Reference readings are model output that changes slowly, and many
//! requests arrive from the same place. Readings are cached per cell of
//! 0.01° (roughly a kilometre) for a short TTL. Failures are not cached.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::upstream::{FetchError, ReferenceSource};

/// Cache key: latitude and longitude in hundredths of a degree.
type CellKey = (i32, i32);

/// Configuration for the reference cache.
#[derive(Debug, Clone)]
pub struct ReferenceCacheConfig {
    /// TTL for cached readings.
    pub ttl: Duration,

    /// Maximum number of cached cells.
    pub max_capacity: u64,
}

impl Default for ReferenceCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Reference source with caching.
///
/// Wraps another `ReferenceSource` and caches its answers, including
/// "no temperature available".
pub struct CachedReferenceSource {
    inner: Arc<dyn ReferenceSource>,
    readings: MokaCache<CellKey, Option<f64>>,
}

impl CachedReferenceSource {
    /// Create a new cached source.
    pub fn new(inner: Arc<dyn ReferenceSource>, config: &ReferenceCacheConfig) -> Self {
        let readings = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, readings }
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.readings.entry_count()
    }

    /// Invalidate all cached readings.
    pub fn invalidate_all(&self) {
        self.readings.invalidate_all();
    }
}

/// The 0.01° cell containing a coordinate.
fn cell(latitude: f64, longitude: f64) -> CellKey {
    (
        (latitude * 100.0).round() as i32,
        (longitude * 100.0).round() as i32,
    )
}

impl ReferenceSource for CachedReferenceSource {
    fn fetch_reference_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> BoxFuture<'_, Result<Option<f64>, FetchError>> {
        Box::pin(async move {
            let key = cell(latitude, longitude);

            if let Some(cached) = self.readings.get(&key).await {
                debug!(?key, "reference cache hit");
                return Ok(cached);
            }

            let reading = self
                .inner
                .fetch_reference_temperature(latitude, longitude)
                .await?;
            self.readings.insert(key, reading).await;

            Ok(reading)
        })
    }
}
