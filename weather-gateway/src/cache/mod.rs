//! Caching layer in front of the upstream services.
//!
//! The station list lives in a single-slot cache with a fixed time-to-live:
//! every request for it either reuses the current entry or refreshes it in
//! place. Reference temperatures are cached per coordinate cell so that
//! repeated lookups from the same place don't hit Open-Meteo every time.

mod clock;
mod reference;
mod stations;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reference::{CachedReferenceSource, ReferenceCacheConfig};
pub use stations::{CacheLookup, CacheStatus, StationCache, StationCacheConfig, StationSnapshot};
