//! Single-slot, time-to-live cache for the station list.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::domain::Station;
use crate::upstream::{FetchError, StationSource};

use super::clock::{Clock, SystemClock};

/// Default cache TTL: 5 minutes.
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Whether a station list came from the cache or from the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from an unexpired entry.
    Hit,
    /// Freshly fetched from upstream.
    Miss,
    /// Served from an expired entry because the refresh failed.
    /// Only ever assigned by callers that opt into serving stale data.
    Stale,
}

impl CacheStatus {
    /// Header value for `X-Cache-Status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fetched station list.
#[derive(Debug)]
pub struct StationSnapshot {
    raw: Bytes,
    stations: Vec<Station>,
    fetched_at: Instant,
}

impl StationSnapshot {
    /// Upstream response body, exactly as received.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Parsed stations, in upstream order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// When the list was fetched.
    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub snapshot: Arc<StationSnapshot>,
    pub status: CacheStatus,
}

/// Configuration for the station cache.
#[derive(Debug, Clone)]
pub struct StationCacheConfig {
    /// How long an entry is served before it is refetched.
    pub ttl: Duration,
}

impl StationCacheConfig {
    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for StationCacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

/// Station list cache.
///
/// Holds at most one entry. Refreshes happen lazily on the request that
/// finds the entry missing or expired, and are serialized: requests that
/// miss while a refresh is running wait for it and reuse its result.
pub struct StationCache {
    source: Arc<dyn StationSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entry: RwLock<Option<Arc<StationSnapshot>>>,
    refresh: Mutex<()>,
}

impl StationCache {
    /// Create an empty cache in front of `source`, using the system clock.
    pub fn new(source: Arc<dyn StationSource>, config: &StationCacheConfig) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            ttl: config.ttl,
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the station list, refreshing it if the entry is missing or expired.
    pub async fn get_stations(&self) -> Result<CacheLookup, FetchError> {
        self.get_stations_at(self.clock.now()).await
    }

    /// Get the station list as of `now`.
    ///
    /// On fetch failure the existing entry, if any, is left in place and the
    /// error is returned. Whether to fall back to [`last_known`](Self::last_known)
    /// is up to the caller.
    pub async fn get_stations_at(&self, now: Instant) -> Result<CacheLookup, FetchError> {
        if let Some(hit) = self.fresh_entry(now).await {
            return Ok(hit);
        }

        let _refreshing = self.refresh.lock().await;

        // A refresh may have completed while we waited for the lock.
        if let Some(hit) = self.fresh_entry(now).await {
            return Ok(hit);
        }

        info!("station cache miss, fetching from upstream");
        let raw = self.source.fetch_stations().await?;
        let stations = Station::parse_list(&raw).map_err(|e| FetchError::Json {
            message: format!("invalid station list: {e}"),
        })?;

        let snapshot = Arc::new(StationSnapshot {
            raw,
            stations,
            fetched_at: now,
        });
        *self.entry.write().await = Some(snapshot.clone());

        info!(
            stations = snapshot.stations.len(),
            ttl_secs = self.ttl.as_secs(),
            "station list cached"
        );

        Ok(CacheLookup {
            snapshot,
            status: CacheStatus::Miss,
        })
    }

    /// The current entry, whatever its age.
    pub async fn last_known(&self) -> Option<Arc<StationSnapshot>> {
        self.entry.read().await.clone()
    }

    /// Get the cache TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn fresh_entry(&self, now: Instant) -> Option<CacheLookup> {
        let guard = self.entry.read().await;
        let snapshot = guard.as_ref()?;

        let age = now.saturating_duration_since(snapshot.fetched_at);
        if age >= self.ttl {
            return None;
        }

        debug!(
            remaining_secs = (self.ttl - age).as_secs(),
            "station cache hit"
        );
        Some(CacheLookup {
            snapshot: snapshot.clone(),
            status: CacheStatus::Hit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use futures::future::BoxFuture;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TWO_STATIONS: &str = r#"[
        {"short_name": "A", "latitude": 52.1, "longitude": 10.1, "temperature": 18.0,
         "relative_humidity": 60.0, "barometric_pressure": 1010.0},
        {"short_name": "B", "latitude": null}
    ]"#;

    /// Station source that serves a canned body, or fails when the body is `None`.
    struct FakeSource {
        body: StdMutex<Option<&'static str>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body: StdMutex::new(Some(body)),
                calls: AtomicUsize::new(0),
            })
        }

        fn set_body(&self, body: Option<&'static str>) {
            *self.body.lock().unwrap() = body;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StationSource for FakeSource {
        fn fetch_stations(&self) -> BoxFuture<'_, Result<Bytes, FetchError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                // Give concurrent callers a chance to run mid-fetch.
                tokio::task::yield_now().await;
                match *self.body.lock().unwrap() {
                    Some(body) => Ok(Bytes::from_static(body.as_bytes())),
                    None => Err(FetchError::Api {
                        status: 503,
                        message: "unavailable".to_string(),
                    }),
                }
            })
        }
    }

    fn cache_with(source: Arc<FakeSource>, ttl_secs: u64) -> (StationCache, ManualClock) {
        let clock = ManualClock::new();
        let config = StationCacheConfig::default().with_ttl(Duration::from_secs(ttl_secs));
        let cache = StationCache::new(source, &config).with_clock(Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn default_config() {
        assert_eq!(StationCacheConfig::default().ttl, Duration::from_secs(300));
    }

    #[test]
    fn status_header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.as_str(), "MISS");
        assert_eq!(CacheStatus::Stale.to_string(), "STALE");
    }

    #[tokio::test]
    async fn miss_then_hit_then_miss_after_ttl() {
        let source = FakeSource::new(TWO_STATIONS);
        let (cache, clock) = cache_with(source.clone(), 300);

        let first = cache.get_stations().await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(source.calls(), 1);

        clock.advance(Duration::from_secs(299));
        let second = cache.get_stations().await.unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert!(Arc::ptr_eq(&first.snapshot, &second.snapshot));
        assert_eq!(source.calls(), 1);

        clock.advance(Duration::from_secs(1));
        let third = cache.get_stations().await.unwrap();
        assert_eq!(third.status, CacheStatus::Miss);
        assert_eq!(source.calls(), 2);
        assert!(!Arc::ptr_eq(&first.snapshot, &third.snapshot));
    }

    #[tokio::test]
    async fn explicit_instants() {
        let source = FakeSource::new(TWO_STATIONS);
        let (cache, clock) = cache_with(source.clone(), 60);
        let t0 = clock.now();

        let miss = cache.get_stations_at(t0).await.unwrap();
        assert_eq!(miss.status, CacheStatus::Miss);
        assert_eq!(miss.snapshot.fetched_at(), t0);

        let hit = cache
            .get_stations_at(t0 + Duration::from_secs(59))
            .await
            .unwrap();
        assert_eq!(hit.status, CacheStatus::Hit);

        let expired = cache
            .get_stations_at(t0 + Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(expired.status, CacheStatus::Miss);
    }

    #[tokio::test]
    async fn snapshot_keeps_raw_body_and_parsed_stations() {
        let source = FakeSource::new(TWO_STATIONS);
        let (cache, _clock) = cache_with(source, 300);

        let lookup = cache.get_stations().await.unwrap();
        assert_eq!(lookup.snapshot.raw().as_ref(), TWO_STATIONS.as_bytes());
        assert_eq!(lookup.snapshot.stations().len(), 2);
        assert!(lookup.snapshot.stations()[0].is_candidate());
        assert!(!lookup.snapshot.stations()[1].is_candidate());
    }

    #[tokio::test]
    async fn failure_on_empty_cache_propagates() {
        let source = FakeSource::new(TWO_STATIONS);
        source.set_body(None);
        let (cache, _clock) = cache_with(source.clone(), 300);

        let result = cache.get_stations().await;
        assert!(matches!(result, Err(FetchError::Api { status: 503, .. })));
        assert!(cache.last_known().await.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_previous_entry() {
        let source = FakeSource::new(TWO_STATIONS);
        let (cache, clock) = cache_with(source.clone(), 300);

        let first = cache.get_stations().await.unwrap();

        clock.advance(Duration::from_secs(301));
        source.set_body(None);
        assert!(cache.get_stations().await.is_err());

        let stale = cache.last_known().await.unwrap();
        assert!(Arc::ptr_eq(&first.snapshot, &stale));

        // The next request retries through the same miss path.
        source.set_body(Some(TWO_STATIONS));
        let recovered = cache.get_stations().await.unwrap();
        assert_eq!(recovered.status, CacheStatus::Miss);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_list_is_not_cached() {
        let source = FakeSource::new(r#"{"error": "maintenance"}"#);
        let (cache, _clock) = cache_with(source.clone(), 300);

        let result = cache.get_stations().await;
        assert!(matches!(result, Err(FetchError::Json { .. })));
        assert!(cache.last_known().await.is_none());

        assert!(cache.get_stations().await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn unreadable_entries_do_not_reject_the_list() {
        let body = r#"[null, {"short_name": "A", "updated_at": 1760601600}, "B"]"#;
        let source = FakeSource::new(body);
        let (cache, _clock) = cache_with(source.clone(), 300);

        let lookup = cache.get_stations().await.unwrap();
        assert_eq!(lookup.status, CacheStatus::Miss);
        assert_eq!(&lookup.snapshot.raw()[..], body.as_bytes());
        assert_eq!(lookup.snapshot.stations().len(), 1);
        assert_eq!(lookup.snapshot.stations()[0].display_name(), "A");
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let source = FakeSource::new(TWO_STATIONS);
        let (cache, _clock) = cache_with(source.clone(), 300);

        let (a, b) = tokio::join!(cache.get_stations(), cache.get_stations());
        let mut statuses = vec![a.unwrap().status, b.unwrap().status];
        statuses.sort_by_key(|s| s.as_str());

        assert_eq!(statuses, vec![CacheStatus::Hit, CacheStatus::Miss]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn zero_ttl_always_refetches() {
        let source = FakeSource::new(TWO_STATIONS);
        let (cache, _clock) = cache_with(source.clone(), 0);

        assert_eq!(cache.get_stations().await.unwrap().status, CacheStatus::Miss);
        assert_eq!(cache.get_stations().await.unwrap().status, CacheStatus::Miss);
        assert_eq!(source.calls(), 2);
    }
}
