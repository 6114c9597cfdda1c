//! Geolocation
//!
//! Provides position acquisition (`position`, `ip_location`), reverse and
//! forward geocoding (`nominatim`), and `get_current_location`, which joins
//! the two into a `LocationResult` that always carries a displayable address.

pub mod ip_location;
pub mod nominatim;
pub mod position;

use crate::coord::Coordinates;
use crate::error::LocationError;
use position::{get_current_position, PositionOptions, PositionProvider};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Outcome of a reverse geocoding lookup
///
/// Lookups never fail. When the service cannot produce an address the
/// result is `Fallback` holding the coordinates as `"lat, lng"` with 4
/// decimals, so there is always something to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "quality", content = "text", rename_all = "snake_case")]
pub enum GeocodedAddress {
    /// Human-readable address from the geocoding service
    Resolved(String),
    /// Numeric coordinate string used when the lookup degraded
    Fallback(String),
}

impl GeocodedAddress {
    /// Fallback address for the given coordinates
    pub fn fallback(lat: f64, lng: f64) -> Self {
        Self::Fallback(Coordinates::new(lat, lng).to_fixed_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Resolved(s) | Self::Fallback(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Resolved(s) | Self::Fallback(s) => s,
        }
    }
}

impl std::fmt::Display for GeocodedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for reverse geocoding backends
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve coordinates to a place description
    ///
    /// Implementations absorb every failure into `GeocodedAddress::Fallback`.
    fn reverse_geocode(&self, lat: f64, lng: f64) -> impl Future<Output = GeocodedAddress> + Send;
}

/// Geocoder that never touches the network
///
/// Always answers with the coordinate fallback. Used when geocoding is
/// disabled in the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl ReverseGeocoder for OfflineGeocoder {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> GeocodedAddress {
        GeocodedAddress::fallback(lat, lng)
    }
}

/// Reverse geocoder chosen by configuration
#[derive(Debug, Clone)]
pub enum GeocoderSource {
    Nominatim(nominatim::NominatimBackend),
    Offline(OfflineGeocoder),
}

impl ReverseGeocoder for GeocoderSource {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> GeocodedAddress {
        match self {
            Self::Nominatim(backend) => backend.reverse_geocode(lat, lng).await,
            Self::Offline(offline) => offline.reverse_geocode(lat, lng).await,
        }
    }
}

/// Current position together with its address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub coords: Coordinates,
    pub address: GeocodedAddress,
}

/// Acquire the current position and resolve it to an address
///
/// Only acquisition errors propagate; geocoding trouble shows up as a
/// `GeocodedAddress::Fallback`.
pub async fn get_current_location<P, G>(
    provider: &P,
    geocoder: &G,
    options: &PositionOptions,
) -> Result<LocationResult, LocationError>
where
    P: PositionProvider,
    G: ReverseGeocoder,
{
    let coords = get_current_position(provider, options).await?;
    let address = geocoder.reverse_geocode(coords.lat, coords.lng).await;

    debug!(
        "Current location {} resolved to '{}' (fallback: {})",
        coords,
        address,
        address.is_fallback()
    );

    Ok(LocationResult { coords, address })
}
