//! User coordinates.

/// Error returned when a coordinate pair cannot be used for a lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinates: {reason}")]
pub struct InvalidLocation {
    reason: &'static str,
}

/// A validated position in signed degrees.
///
/// Both components are finite and within their geographic ranges, so any
/// `UserLocation` can be fed straight into [`distance_km`](super::distance_km).
///
/// # Examples
///
/// ```
/// use weather_gateway::domain::UserLocation;
///
/// let here = UserLocation::parse("52.10", "10.10").unwrap();
/// assert_eq!(here.latitude(), 52.1);
///
/// assert!(UserLocation::parse("north", "10.10").is_err());
/// assert!(UserLocation::parse("91", "10.10").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserLocation {
    latitude: f64,
    longitude: f64,
}

impl UserLocation {
    /// Build a location from already-numeric components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidLocation> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(InvalidLocation {
                reason: "lat and long must be finite numbers",
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidLocation {
                reason: "lat must be between -90 and 90",
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidLocation {
                reason: "long must be between -180 and 180",
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a location from query-string values.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, InvalidLocation> {
        let parse = |s: &str| {
            s.trim().parse::<f64>().map_err(|_| InvalidLocation {
                reason: "lat and long must be numeric",
            })
        };
        Self::new(parse(latitude)?, parse(longitude)?)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
