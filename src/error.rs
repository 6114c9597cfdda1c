//! Error types for ecobloom

use thiserror::Error;

/// Why the current position could not be acquired
///
/// Decided by the acquisition layer so callers can prompt the user
/// differently per kind (e.g. suggest manual entry on `PermissionDenied`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Geolocation is not supported by this environment")]
    UnsupportedEnvironment,

    #[error("Location permission denied. Please enable location access.")]
    PermissionDenied,

    #[error("Location information unavailable")]
    PositionUnavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("Unable to get location: {0}")]
    Other(String),
}

impl LocationError {
    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedEnvironment => "UNSUPPORTED_ENVIRONMENT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::PositionUnavailable => "POSITION_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::Other(_) => "LOCATION_ERROR",
        }
    }
}

/// Main error type for ecobloom operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Data access error: {message}")]
    DataAccess {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Detection error: {0}")]
    Detection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Data store failure wrapping the underlying cause
    pub fn data_access<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DataAccess {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Data store failure without an underlying error value
    pub fn data_access_msg(message: impl Into<String>) -> Self {
        Self::DataAccess {
            message: message.into(),
            source: None,
        }
    }
}

/// Result type alias for ecobloom operations
pub type Result<T> = std::result::Result<T, Error>;
