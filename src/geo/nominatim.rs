//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for reverse and forward geocoding.
//! Nominatim rejects anonymous traffic, so every request carries a
//! `User-Agent` client identifier.

use crate::constants::api::{NOMINATIM_URL, NOMINATIM_USER_AGENT};
use crate::error::{Error, Result};
use crate::geo::{GeoLocation, GeocodedAddress, ReverseGeocoder};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim reverse response (`addressdetails=1`)
#[derive(Debug, Default, Deserialize)]
struct ReverseResult {
    display_name: Option<String>,
    address: Option<AddressDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressDetails {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Build the short address shown to users
///
/// Locality (city, town or village), then state, then country. Without any
/// of those, the first three segments of `display_name`.
fn condense_address(result: &ReverseResult) -> Option<String> {
    if let Some(address) = &result.address {
        let locality = non_empty(&address.city)
            .or_else(|| non_empty(&address.town))
            .or_else(|| non_empty(&address.village));

        let parts: Vec<&str> = [locality, non_empty(&address.state), non_empty(&address.country)]
            .into_iter()
            .flatten()
            .collect();

        if !parts.is_empty() {
            return Some(parts.join(", "));
        }
    }

    let display_name = non_empty(&result.display_name)?;
    Some(display_name.split(',').take(3).collect::<Vec<_>>().join(","))
}

impl NominatimBackend {
    /// Create a new Nominatim backend
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: NOMINATIM_URL.to_string(),
            user_agent: NOMINATIM_USER_AGENT.to_string(),
        }
    }

    /// Point the backend at a different Nominatim instance
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the client identifier sent with each request
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Geocoding(format!("Invalid longitude: {}", lng)))?;
        Ok((lat, lng))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        Ok(response)
    }

    /// Reverse geocode, reporting every failure
    ///
    /// `reverse_geocode` is the lenient wrapper callers normally want.
    pub async fn lookup_address(&self, lat: f64, lng: f64) -> Result<String> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&addressdetails=1",
            self.base_url, lat, lng
        );

        let result: ReverseResult = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        condense_address(&result)
            .ok_or_else(|| Error::Geocoding("Nominatim response has no usable address".to_string()))
    }

    /// Geocode a place name to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    pub async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let results: Vec<SearchResult> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        match results.into_iter().next() {
            Some(result) => {
                let (lat, lng) = Self::parse_coords(&result.lat, &result.lon)?;
                debug!("Geocoded '{}' to {}", query, result.display_name);
                Ok(Some(GeoLocation {
                    lat,
                    lng,
                    display_name: result.display_name,
                }))
            }
            None => Ok(None),
        }
    }
}

impl Default for NominatimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseGeocoder for NominatimBackend {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> GeocodedAddress {
        match self.lookup_address(lat, lng).await {
            Ok(address) => GeocodedAddress::Resolved(address),
            Err(e) => {
                warn!("Reverse geocoding error: {}", e);
                GeocodedAddress::fallback(lat, lng)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, unreachable_url};
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::{routing::get, Json, Router};
    use std::collections::HashMap;

    fn parse(json: serde_json::Value) -> ReverseResult {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_parse_coords() {
        let (lat, lng) = NominatimBackend::parse_coords("40.7128", "-74.0060").unwrap();
        assert!((lat - 40.7128).abs() < 0.0001);
        assert!((lng - (-74.0060)).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimBackend::parse_coords("invalid", "0").is_err());
        assert!(NominatimBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_condense_prefers_city() {
        let result = parse(serde_json::json!({
            "display_name": "Alexanderplatz, Mitte, Berlin, 10178, Deutschland",
            "address": {"city": "Berlin", "town": "Ignored", "state": "Berlin", "country": "Deutschland"}
        }));
        assert_eq!(condense_address(&result).unwrap(), "Berlin, Berlin, Deutschland");
    }

    #[test]
    fn test_condense_town_then_village() {
        let town = parse(serde_json::json!({"address": {"town": "Hebden Bridge", "country": "United Kingdom"}}));
        assert_eq!(condense_address(&town).unwrap(), "Hebden Bridge, United Kingdom");

        let village = parse(serde_json::json!({"address": {"city": "", "village": "Giethoorn", "state": "Overijssel"}}));
        assert_eq!(condense_address(&village).unwrap(), "Giethoorn, Overijssel");
    }

    #[test]
    fn test_condense_falls_back_to_display_name() {
        let result = parse(serde_json::json!({
            "display_name": "Atlantic Ocean, Somewhere, Far, Away",
            "address": {}
        }));
        assert_eq!(condense_address(&result).unwrap(), "Atlantic Ocean, Somewhere, Far");
    }

    #[test]
    fn test_condense_nothing_usable() {
        assert!(condense_address(&parse(serde_json::json!({"error": "Unable to geocode"}))).is_none());
        assert!(condense_address(&parse(serde_json::json!({"display_name": "  ", "address": {}}))).is_none());
    }

    #[tokio::test]
    async fn test_reverse_geocode_resolved() {
        let router = Router::new().route(
            "/reverse",
            get(|Query(params): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                assert_eq!(params["format"], "json");
                assert_eq!(params["addressdetails"], "1");
                assert_eq!(params["lat"], "48.8566");
                assert_eq!(params["lon"], "2.3522");
                assert_eq!(headers["user-agent"], "EcoBloom/1.0");
                Json(serde_json::json!({
                    "display_name": "Paris, Île-de-France, France métropolitaine, France",
                    "address": {"city": "Paris", "state": "Île-de-France", "country": "France"}
                }))
            }),
        );
        let backend = NominatimBackend::new().with_base_url(serve(router).await);

        let address = backend.reverse_geocode(48.8566, 2.3522).await;
        assert_eq!(address, GeocodedAddress::Resolved("Paris, Île-de-France, France".to_string()));
    }

    #[tokio::test]
    async fn test_reverse_geocode_network_failure_falls_back() {
        let backend = NominatimBackend::new().with_base_url(unreachable_url().await);

        let address = backend.reverse_geocode(40.7128, -74.006).await;
        assert_eq!(address, GeocodedAddress::Fallback("40.7128, -74.0060".to_string()));
        assert!(backend.lookup_address(40.7128, -74.006).await.is_err());
    }

    #[tokio::test]
    async fn test_reverse_geocode_bad_status_and_payload_fall_back() {
        let router = Router::new()
            .route("/blocked/reverse", get(|| async { StatusCode::FORBIDDEN }))
            .route("/garbage/reverse", get(|| async { "<html>not json</html>" }));
        let base = serve(router).await;

        for path in ["/blocked", "/garbage"] {
            let backend = NominatimBackend::new().with_base_url(format!("{base}{path}"));
            let address = backend.reverse_geocode(-33.86882, 151.20929).await;
            assert_eq!(address.as_str(), "-33.8688, 151.2093");
            assert!(address.is_fallback());
        }
    }

    #[tokio::test]
    async fn test_geocode_forward() {
        let router = Router::new().route(
            "/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params["q"] == "Berlin" {
                    Json(serde_json::json!([
                        {"lat": "52.5170365", "lon": "13.3888599", "display_name": "Berlin, Deutschland"}
                    ]))
                } else {
                    Json(serde_json::json!([]))
                }
            }),
        );
        let backend = NominatimBackend::new().with_base_url(serve(router).await);

        let found = backend.geocode("Berlin").await.unwrap().unwrap();
        assert!((found.lat - 52.517).abs() < 0.001);
        assert_eq!(found.display_name, "Berlin, Deutschland");

        assert!(backend.geocode("Nowhere at all").await.unwrap().is_none());
    }
}
