//! Core domain types for the weather gateway.
//!
//! This module contains the station model as reported by the upstream
//! sensor network, validated user coordinates, and great-circle distance.

mod distance;
mod location;
mod station;

pub use distance::{EARTH_RADIUS_KM, distance_km};
pub use location::{InvalidLocation, UserLocation};
pub use station::{CompleteReadings, Station, UNKNOWN_STATION_NAME};
