//! Centralized constants for the ecobloom crate
//!
//! Values shared by several modules live here so the geo, listing and
//! config code agree on them.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Client identifier sent to Nominatim (anonymous traffic is rejected)
    pub const NOMINATIM_USER_AGENT: &str = "EcoBloom/1.0";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Material detection backend
    pub const DETECTION_URL: &str = "http://localhost:8000";
}

/// Position acquisition policy
pub mod location {
    /// Upper bound on a single position request, in milliseconds
    pub const TIMEOUT_MS: u64 = 10_000;

    /// Oldest cached fix that may be reused, in seconds (5 minutes)
    pub const MAXIMUM_AGE_SECS: u64 = 300;

    /// IP location cache file name
    pub const CACHE_FILE: &str = "ip_location_cache.json";
}

/// Listing search policy
pub mod search {
    /// Only listings of this transaction type are searchable
    pub const OFFERING: &str = "offering";

    /// Only listings in this status are searchable
    pub const ACTIVE: &str = "active";

    /// Category value that imposes no constraint
    pub const ALL_CATEGORIES: &str = "all";

    /// Category assigned to rows with no resolvable category
    pub const FALLBACK_CATEGORY: &str = "other";

    /// Row cap for the non-geographic listing query
    pub const DEFAULT_LIMIT: usize = 50;

    /// Remote procedure performing the radius scan
    pub const RADIUS_PROCEDURE: &str = "listings_within_radius";
}
