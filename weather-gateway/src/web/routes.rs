//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderName, Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::cache::{CacheLookup, CacheStatus};
use crate::config::StalePolicy;
use crate::domain::{InvalidLocation, UserLocation};
use crate::selector::select;
use crate::upstream::FetchError;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Response header reporting whether the station list came from the cache.
pub const X_CACHE_STATUS: HeaderName = HeaderName::from_static("x-cache-status");

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // The page is usually served from here, but the JSON endpoints are also
    // meant to be called from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .expose_headers([X_CACHE_STATUS]);

    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/nodes", get(proxy_nodes))
        .route("/api", get(nearest_station))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page.
async fn index_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = IndexTemplate {
        cache_ttl: format_ttl(state.stations.ttl()),
        temp_tolerance_c: state.temp_tolerance_c,
    };
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// The upstream station list, as received.
async fn proxy_nodes(State(state): State<AppState>) -> Result<Response, AppError> {
    let lookup = load_stations(&state).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (X_CACHE_STATUS, lookup.status.as_str()),
        ],
        lookup.snapshot.raw().clone(),
    )
        .into_response())
}

/// The best-matching station for the given coordinates.
async fn nearest_station(
    State(state): State<AppState>,
    Query(query): Query<NearestStationQuery>,
) -> Result<Response, AppError> {
    let user = parse_location(&query)?;

    let (lookup, reference) = tokio::join!(
        load_stations(&state),
        state
            .reference
            .fetch_reference_temperature(user.latitude(), user.longitude())
    );
    let lookup = lookup?;
    let reference = reference?;

    let selection = select(
        &user,
        lookup.snapshot.stations(),
        reference,
        state.temp_tolerance_c,
    )
    .ok_or_else(|| AppError::NotFound {
        message: "no station with a complete set of readings found".to_string(),
    })?;

    debug!(
        station = selection.station.display_name(),
        distance_km = selection.distance_km,
        temperature_diff = ?selection.temperature_diff,
        "selected station"
    );

    let body = NearestStationResponse::from_selection(&user, &selection);
    Ok(([(X_CACHE_STATUS, lookup.status.as_str())], Json(body)).into_response())
}

/// Validate the coordinates of a lookup.
fn parse_location(query: &NearestStationQuery) -> Result<UserLocation, AppError> {
    let (Some(lat), Some(long)) = (query.latitude(), query.longitude()) else {
        return Err(AppError::BadRequest {
            message: "missing parameters, example: /api?lat=52.10&long=10.10".to_string(),
        });
    };

    UserLocation::parse(lat, long).map_err(AppError::from)
}

/// Get the station list, applying the stale policy on refresh failure.
async fn load_stations(state: &AppState) -> Result<CacheLookup, AppError> {
    match state.stations.get_stations().await {
        Ok(lookup) => Ok(lookup),
        Err(e) => {
            if state.stale_policy == StalePolicy::ServeStale
                && let Some(snapshot) = state.stations.last_known().await
            {
                warn!(error = %e, "station refresh failed, serving stale list");
                return Ok(CacheLookup {
                    snapshot,
                    status: CacheStatus::Stale,
                });
            }
            Err(AppError::from(e))
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Upstream { message: String },
}

impl From<InvalidLocation> for AppError {
    fn from(e: InvalidLocation) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
