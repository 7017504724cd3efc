//! Station selection by proximity and temperature plausibility.
//!
//! Given the user's position, the current station list and an optional
//! reference temperature from an independent source, pick the station that
//! best represents the weather at the user's location:
//!
//! 1. Only stations with a complete set of readings are considered.
//! 2. Without a reference temperature, the nearest candidate wins.
//! 3. With a reference, the nearest candidate within the tolerance wins.
//!    This keeps a close but faulty sensor from being chosen.
//! 4. If no candidate is within tolerance, the smallest deviation wins, with
//!    distance as the tie-breaker.
//!
//! In every case ties go to the station that appears first in the input.

use std::cmp::Ordering;

use crate::domain::{Station, UserLocation, distance_km};

/// Default tolerance between station and reference temperature, in °C.
pub const DEFAULT_TEMP_TOLERANCE_C: f64 = 2.0;

/// The outcome of a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult<'a> {
    /// The chosen station.
    pub station: &'a Station,

    /// Great-circle distance from the user, in kilometres.
    pub distance_km: f64,

    /// Absolute deviation from the reference temperature.
    /// `None` when no reference temperature was available.
    pub temperature_diff: Option<f64>,
}

/// A candidate station with its comparison keys.
struct Scored<'a> {
    station: &'a Station,
    distance_km: f64,
    /// 0.0 stands in for "no reference" here; it never leaves this module.
    temp_diff: f64,
}

/// Select the best-matching station for a user.
///
/// Returns `None` when no station has a complete set of readings.
pub fn select<'a>(
    user: &UserLocation,
    stations: &'a [Station],
    reference_temperature: Option<f64>,
    temp_tolerance_c: f64,
) -> Option<SelectionResult<'a>> {
    let candidates: Vec<Scored<'a>> = stations
        .iter()
        .filter_map(|station| {
            let readings = station.complete_readings()?;
            Some(Scored {
                station,
                distance_km: distance_km(
                    user.latitude(),
                    user.longitude(),
                    readings.latitude,
                    readings.longitude,
                ),
                temp_diff: reference_temperature
                    .map(|reference| (readings.temperature - reference).abs())
                    .unwrap_or(0.0),
            })
        })
        .collect();

    // `min_by` returns the first of several equal elements, which gives the
    // input-order tie-break.
    let best = match reference_temperature {
        None => candidates.iter().min_by(|a, b| by_distance(a, b))?,
        Some(_) => {
            let nearest_plausible = candidates
                .iter()
                .filter(|c| c.temp_diff <= temp_tolerance_c)
                .min_by(|a, b| by_distance(a, b));
            match nearest_plausible {
                Some(best) => best,
                None => candidates.iter().min_by(|a, b| {
                    a.temp_diff
                        .total_cmp(&b.temp_diff)
                        .then_with(|| by_distance(a, b))
                })?,
            }
        }
    };

    Some(SelectionResult {
        station: best.station,
        distance_km: best.distance_km,
        temperature_diff: reference_temperature.map(|_| best.temp_diff),
    })
}

fn by_distance(a: &Scored<'_>, b: &Scored<'_>) -> Ordering {
    a.distance_km.total_cmp(&b.distance_km)
}
