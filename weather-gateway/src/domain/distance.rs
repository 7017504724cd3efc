//! Great-circle distance on a spherical earth.

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points given in signed degrees.
///
/// Uses the haversine formula. The result is non-negative and finite for
/// finite inputs; callers are responsible for rejecting NaN or infinite
/// coordinates before calling this.
///
/// # Examples
///
/// ```
/// use weather_gateway::domain::distance_km;
///
/// assert_eq!(distance_km(52.1, 10.1, 52.1, 10.1), 0.0);
///
/// let berlin_munich = distance_km(52.52, 13.405, 48.1351, 11.582);
/// assert!((berlin_munich - 504.0).abs() < 2.0);
/// ```
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
