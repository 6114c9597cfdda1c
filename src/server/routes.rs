//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::distance::{calculate_distance, format_distance};
use crate::coord::Coordinates;
use crate::error::Error;
use crate::geo::ReverseGeocoder;
use crate::format::json::SearchResponse;
use crate::listings::{search_listings, ListingStore, SearchFilters};
use crate::server::state::AppState;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Create the API router
pub fn create_router<S, G>(state: Arc<AppState<S, G>>) -> Router
where
    S: ListingStore + 'static,
    G: ReverseGeocoder + 'static,
{
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/listings", get(listings_handler::<S, G>))
        .route("/api/distance", get(distance_handler))
        .route("/api/reverse", get(reverse_handler::<S, G>))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "DATA_ACCESS_ERROR" | "GEOCODING_ERROR" | "DETECTION_ERROR" => StatusCode::BAD_GATEWAY,
            "CONFIG_ERROR" | "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::Location(e) => e.code(),
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidRadius(_) => "INVALID_RADIUS",
            Error::DataAccess { .. } => "DATA_ACCESS_ERROR",
            Error::Geocoding(_) => "GEOCODING_ERROR",
            Error::Detection(_) => "DETECTION_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check
///
/// GET /api/health
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Listing search query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListingsParams {
    /// Free text
    pub q: Option<String>,
    /// Category slug or "all"
    pub category: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Radius in km
    pub radius: Option<f64>,
}

impl ListingsParams {
    fn into_filters(self) -> Result<SearchFilters, Error> {
        let location = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            (None, None) => None,
            _ => {
                return Err(Error::InvalidCoordinates(
                    "lat and lng must be given together".to_string(),
                ))
            }
        };

        Ok(SearchFilters {
            query: self.q,
            category: self.category,
            location,
            radius: self.radius,
        })
    }
}

/// Search listings
///
/// GET /api/listings?q=&category=&lat=&lng=&radius=
async fn listings_handler<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Query(params): Query<ListingsParams>,
) -> Result<Json<SearchResponse>, ApiError>
where
    S: ListingStore,
    G: ReverseGeocoder,
{
    let filters = params.into_filters()?;

    let listings = search_listings(&state.store, &filters).await.map_err(|e| {
        warn!("Listing search failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(SearchResponse::new(listings)))
}

/// Distance query parameters
#[derive(Debug, Deserialize)]
pub struct DistanceParams {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
}

/// Distance response
#[derive(Debug, Serialize, Deserialize)]
pub struct DistanceResponse {
    /// Kilometers, rounded to one decimal
    pub km: f64,
    /// e.g. "2.4km away"
    pub display: String,
}

/// Great-circle distance between two points
///
/// GET /api/distance?from_lat=&from_lng=&to_lat=&to_lng=
async fn distance_handler(
    Query(params): Query<DistanceParams>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let from = Coordinates::new(params.from_lat, params.from_lng);
    let to = Coordinates::new(params.to_lat, params.to_lng);
    from.validate()?;
    to.validate()?;

    let km = calculate_distance(from, to);
    Ok(Json(DistanceResponse {
        km,
        display: format_distance(km),
    }))
}

/// Reverse geocoding query parameters
#[derive(Debug, Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lng: f64,
}

/// Reverse geocoding response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReverseResponse {
    pub address: String,
    /// True when the address is the coordinate fallback
    pub fallback: bool,
}

/// Address for a coordinate pair
///
/// GET /api/reverse?lat=&lng=
async fn reverse_handler<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    Query(params): Query<ReverseParams>,
) -> Result<Json<ReverseResponse>, ApiError>
where
    S: ListingStore,
    G: ReverseGeocoder,
{
    Coordinates::new(params.lat, params.lng).validate()?;

    let address = state.geocoder.reverse_geocode(params.lat, params.lng).await;
    Ok(Json(ReverseResponse {
        fallback: address.is_fallback(),
        address: address.into_string(),
    }))
}
