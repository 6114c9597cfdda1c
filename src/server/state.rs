//! Server shared state
//!
//! Holds the shared resources behind the HTTP handlers.

use crate::geo::ReverseGeocoder;
use crate::listings::ListingStore;

/// Shared state for the HTTP server
///
/// Read-only after startup; handlers share it through an `Arc`.
pub struct AppState<S, G> {
    /// Listing store queried by `/api/listings`
    pub store: S,

    /// Reverse geocoder behind `/api/reverse`
    pub geocoder: G,
}

impl<S, G> AppState<S, G>
where
    S: ListingStore,
    G: ReverseGeocoder,
{
    /// Create new application state
    pub fn new(store: S, geocoder: G) -> Self {
        Self {
            store,
            geocoder,
        }
    }
}
