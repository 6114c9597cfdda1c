//! IP-based geolocation
//!
//! Uses ip-api.com as the position source for hosts without a GPS or
//! browser geolocation API. A file cache implements the maximum-age policy:
//! a fix younger than `PositionOptions::maximum_age` is returned without a
//! network request.

use crate::constants::api::IP_API_URL;
use crate::constants::location::CACHE_FILE;
use crate::coord::Coordinates;
use crate::error::LocationError;
use crate::geo::position::{PositionOptions, PositionProvider};
use crate::geo::GeoLocation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// IP location service with caching
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    base_url: String,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

/// Cached location data
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedLocation {
    location: GeoLocation,
    timestamp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Map a transport failure onto the acquisition error kinds
fn classify_request_error(err: &reqwest::Error) -> LocationError {
    if err.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::PositionUnavailable
    }
}

impl IpLocator {
    /// Create a new IP locator with default cache path
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir().map(|p| p.join("ecobloom").join(CACHE_FILE));

        Self {
            client: reqwest::Client::new(),
            base_url: IP_API_URL.to_string(),
            cache_path,
        }
    }

    /// Create an IP locator with a specific cache path
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            cache_path: Some(cache_path),
            ..Self::new()
        }
    }

    /// Create an IP locator without caching
    pub fn without_cache() -> Self {
        Self {
            cache_path: None,
            ..Self::new()
        }
    }

    /// Point the locator at a different lookup endpoint
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get current location based on IP address
    ///
    /// A cached fix younger than `maximum_age` is reused.
    pub async fn locate(&self, maximum_age: Duration) -> Result<GeoLocation, LocationError> {
        if let Some(cached) = self.load_cache(maximum_age) {
            debug!("Using cached IP location: {}", cached.display_name);
            return Ok(cached);
        }

        let location = self.fetch_location().await?;
        self.save_cache(&location);

        Ok(location)
    }

    /// Fetch location from ip-api.com
    async fn fetch_location(&self) -> Result<GeoLocation, LocationError> {
        let response = self.client.get(&self.base_url).send().await.map_err(|e| {
            warn!("IP location request failed: {}", e);
            classify_request_error(&e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            warn!("IP location API returned status: {}", status);
            return Err(LocationError::PositionUnavailable);
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            LocationError::Other(format!("Failed to parse IP location response: {}", e))
        })?;

        if data.status != "success" {
            debug!("IP location lookup failed: {:?}", data.message);
            return Err(LocationError::PositionUnavailable);
        }

        let (Some(lat), Some(lng)) = (data.lat, data.lon) else {
            return Err(LocationError::PositionUnavailable);
        };

        // Build display name from available fields
        let display_name = [data.city, data.region_name, data.country]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(GeoLocation {
            lat,
            lng,
            display_name: if display_name.is_empty() {
                Coordinates::new(lat, lng).to_fixed_string()
            } else {
                display_name
            },
        })
    }

    /// Load cached location if younger than `maximum_age`
    fn load_cache(&self, maximum_age: Duration) -> Option<GeoLocation> {
        let cache_path = self.cache_path.as_ref()?;

        if maximum_age.is_zero() || !cache_path.exists() {
            return None;
        }

        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedLocation = serde_json::from_str(&content).ok()?;

        let age = now_secs().saturating_sub(cached.timestamp);
        if age < maximum_age.as_secs() {
            Some(cached.location)
        } else {
            None
        }
    }

    /// Save location to cache
    fn save_cache(&self, location: &GeoLocation) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let cached = CachedLocation {
            location: location.clone(),
            timestamp: now_secs(),
        };

        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionProvider for IpLocator {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, LocationError> {
        if options.high_accuracy {
            debug!("IP geolocation is city-level; high accuracy not available");
        }
        let location = self.locate(options.maximum_age).await?;
        Ok(location.coords())
    }
}
