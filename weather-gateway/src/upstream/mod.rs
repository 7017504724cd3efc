//! Clients for the services the gateway sits in front of.
//!
//! - the sensor network's node list, which returns every station as a JSON array;
//! - Open-Meteo, which supplies an independent reference temperature for a
//!   coordinate.
//!
//! Each collaborator is a trait so the cache and the web layer can be driven
//! by in-memory fakes in tests.

mod error;
mod reference;
mod stations;

pub use error::FetchError;
pub use reference::{OpenMeteoClient, OpenMeteoConfig, ReferenceSource};
pub use stations::{StationClient, StationClientConfig, StationSource};
