//! Web layer for the weather gateway.
//!
//! Serves the station list to browsers with permissive CORS headers and
//! answers nearest-station lookups as JSON.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{X_CACHE_STATUS, create_router};
pub use state::AppState;
pub use templates::*;
