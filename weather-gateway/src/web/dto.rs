//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::UserLocation;
use crate::selector::SelectionResult;

/// Query string of the nearest-station lookup.
///
/// Values are kept as strings so that missing and malformed coordinates can
/// be reported with our own error bodies.
#[derive(Debug, Default, Deserialize)]
pub struct NearestStationQuery {
    /// Latitude in signed degrees
    pub lat: Option<String>,

    /// Longitude in signed degrees
    pub long: Option<String>,

    /// Alias for `long`
    pub lon: Option<String>,
}

impl NearestStationQuery {
    /// Latitude, if given and not blank.
    pub fn latitude(&self) -> Option<&str> {
        non_blank(&self.lat)
    }

    /// Longitude from `long`, falling back to `lon`.
    pub fn longitude(&self) -> Option<&str> {
        non_blank(&self.long).or_else(|| non_blank(&self.lon))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// The station chosen for a user.
#[derive(Debug, Serialize)]
pub struct NearestStationResponse {
    /// Requested latitude
    pub lat: f64,

    /// Requested longitude
    pub long: f64,

    /// Station name (long name, short name, or "Unknown")
    pub node_name: String,

    /// Distance from the user, rounded to 2 decimals
    pub distance_km: f64,

    /// Station temperature (°C)
    pub temperature: Option<f64>,

    /// Station relative humidity (%)
    pub relative_humidity: Option<f64>,

    /// Station pressure (hPa)
    pub barometric_pressure: Option<f64>,

    /// Upstream timestamp of the readings
    pub updated_at: Option<String>,

    /// Whether a reference temperature was available for the check
    pub checked_with_reference: bool,

    /// Deviations from the reference reading
    pub check_diff: CheckDiff,
}

/// Deviations from the reference reading.
#[derive(Debug, Serialize)]
pub struct CheckDiff {
    /// Absolute temperature deviation, rounded to 2 decimals
    pub temperature: Option<f64>,
}

impl NearestStationResponse {
    pub fn from_selection(user: &UserLocation, selection: &SelectionResult<'_>) -> Self {
        let station = selection.station;
        Self {
            lat: user.latitude(),
            long: user.longitude(),
            node_name: station.display_name().to_string(),
            distance_km: round2(selection.distance_km),
            temperature: station.temperature,
            relative_humidity: station.relative_humidity,
            barometric_pressure: station.barometric_pressure,
            updated_at: station.updated_at.clone(),
            checked_with_reference: selection.temperature_diff.is_some(),
            check_diff: CheckDiff {
                temperature: selection.temperature_diff.map(round2),
            },
        }
    }
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;

    fn station() -> Station {
        Station {
            short_name: Some("HB".to_string()),
            long_name: Some("Harzblick".to_string()),
            latitude: Some(52.127),
            longitude: Some(10.1),
            temperature: Some(18.0),
            relative_humidity: Some(61.5),
            barometric_pressure: Some(1013.2),
            updated_at: Some("2026-10-16T08:15:00Z".to_string()),
        }
    }

    #[test]
    fn round2_test() {
        assert_eq!(round2(3.004_999), 3.0);
        assert_eq!(round2(3.005_001), 3.01);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn response_from_selection() {
        let user = UserLocation::new(52.10, 10.10).unwrap();
        let station = station();
        let selection = SelectionResult {
            station: &station,
            distance_km: 3.002_345,
            temperature_diff: Some(1.0049),
        };

        let response = NearestStationResponse::from_selection(&user, &selection);
        assert_eq!(response.lat, 52.10);
        assert_eq!(response.long, 10.10);
        assert_eq!(response.node_name, "Harzblick");
        assert_eq!(response.distance_km, 3.0);
        assert_eq!(response.temperature, Some(18.0));
        assert_eq!(response.updated_at.as_deref(), Some("2026-10-16T08:15:00Z"));
        assert!(response.checked_with_reference);
        assert_eq!(response.check_diff.temperature, Some(1.0));
    }

    #[test]
    fn no_reference_serializes_null_diff() {
        let user = UserLocation::new(52.10, 10.10).unwrap();
        let station = station();
        let selection = SelectionResult {
            station: &station,
            distance_km: 3.0,
            temperature_diff: None,
        };

        let json = serde_json::to_value(NearestStationResponse::from_selection(&user, &selection))
            .unwrap();
        assert_eq!(json["check_diff"]["temperature"], serde_json::Value::Null);
        assert_eq!(json["checked_with_reference"], false);
        assert_eq!(json["node_name"], "Harzblick");
    }

    #[test]
    fn query_longitude_alias() {
        let query = NearestStationQuery {
            lat: Some("52.1".to_string()),
            long: None,
            lon: Some("10.1".to_string()),
        };
        assert_eq!(query.latitude(), Some("52.1"));
        assert_eq!(query.longitude(), Some("10.1"));

        let query = NearestStationQuery {
            lat: Some("  ".to_string()),
            long: Some("10.2".to_string()),
            lon: Some("10.1".to_string()),
        };
        assert_eq!(query.latitude(), None);
        assert_eq!(query.longitude(), Some("10.2"));
    }
}
