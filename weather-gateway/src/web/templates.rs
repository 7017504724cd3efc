//! Askama templates for the web frontend.

use std::time::Duration;

use askama::Template;

/// Home page: locates the browser and shows the matched station.
///
/// The page calls `/api` for the selection; it has no matching logic of its own.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Station list cache lifetime, as shown on the page ("5 min", "45 s").
    pub cache_ttl: String,

    /// Temperature tolerance used for the plausibility check.
    pub temp_tolerance_c: f64,
}

/// Whole minutes when the TTL divides evenly, seconds otherwise.
pub fn format_ttl(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{secs} s")
    }
}
