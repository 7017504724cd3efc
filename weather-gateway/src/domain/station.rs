//! Sensor stations as reported by the upstream node list.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

/// Name reported when a station has neither a long nor a short name.
pub const UNKNOWN_STATION_NAME: &str = "Unknown";

/// A remote sensor node and its latest readings.
///
/// Every reading is optional: nodes regularly report partial data. Numeric
/// fields accept either JSON numbers or numeric strings; anything else
/// (including NaN and infinities) is treated as absent. Text fields accept
/// strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Station {
    #[serde(default, deserialize_with = "lenient_text")]
    pub short_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub long_name: Option<String>,

    /// Signed degrees.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,

    /// Signed degrees.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,

    /// Degrees Celsius.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,

    /// Percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub relative_humidity: Option<f64>,

    /// Hectopascal.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub barometric_pressure: Option<f64>,

    /// Upstream timestamp, passed through untouched.
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
}

/// Readings of a station that has every field required for selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompleteReadings {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub relative_humidity: f64,
    pub barometric_pressure: f64,
}

impl Station {
    /// Parse the upstream JSON array of stations.
    ///
    /// Only a body that is not a JSON array is an error. Entries that are not
    /// station objects are skipped.
    pub fn parse_list(json: &[u8]) -> Result<Vec<Station>, serde_json::Error> {
        let entries: Vec<Value> = serde_json::from_slice(json)?;
        let total = entries.len();

        let stations: Vec<Station> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                if !entry.is_object() {
                    debug!(index, %entry, "skipping non-object station entry");
                    return None;
                }
                match Station::deserialize(entry) {
                    Ok(station) => Some(station),
                    Err(e) => {
                        debug!(index, error = %e, "skipping unreadable station entry");
                        None
                    }
                }
            })
            .collect();

        if stations.len() < total {
            warn!(
                skipped = total - stations.len(),
                total, "station list contained unreadable entries"
            );
        }
        Ok(stations)
    }

    /// The station's readings, if all of them are present.
    pub fn complete_readings(&self) -> Option<CompleteReadings> {
        Some(CompleteReadings {
            latitude: self.latitude?,
            longitude: self.longitude?,
            temperature: self.temperature?,
            relative_humidity: self.relative_humidity?,
            barometric_pressure: self.barometric_pressure?,
        })
    }

    /// Whether the station is eligible for selection.
    pub fn is_candidate(&self) -> bool {
        self.complete_readings().is_some()
    }

    /// Human-readable name: long name, then short name, then a placeholder.
    pub fn display_name(&self) -> &str {
        [&self.long_name, &self.short_name]
            .into_iter()
            .flatten()
            .map(|s| s.as_str())
            .find(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN_STATION_NAME)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Text(String),
        Number(serde_json::Number),
        Other(IgnoredAny),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::Text(s)) => Some(s),
        Some(Text::Number(n)) => Some(n.to_string()),
        Some(Text::Other(_)) | None => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reading {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    let value = match Option::<Reading>::deserialize(deserializer)? {
        Some(Reading::Number(v)) => Some(v),
        Some(Reading::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(Reading::Other(_)) | None => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}
