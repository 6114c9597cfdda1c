//! Coordinates and distance computation
//!
//! This module handles:
//! - The `Coordinates` value type shared by every other module
//! - Great-circle distance and its display formatting (`distance`)

pub mod distance;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Render as `"lat, lng"` with 4 decimal places
    ///
    /// Used wherever a place needs a label and no address is known.
    pub fn to_fixed_string(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

impl std::str::FromStr for Coordinates {
    type Err = String;

    /// Parse `"lat,lng"` (whitespace around either part is ignored)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("Expected \"lat,lng\", got: {}", s))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("Invalid latitude: {}", lat.trim()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("Invalid longitude: {}", lng.trim()))?;
        Ok(Self::new(lat, lng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(-90.0, -180.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0).validate(),
            Err(Error::InvalidCoordinates(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, -180.5).validate(),
            Err(Error::InvalidCoordinates(_))
        ));
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_to_fixed_string() {
        let c = Coordinates::new(52.520008, 13.404954);
        assert_eq!(c.to_fixed_string(), "52.5200, 13.4050");

        let c = Coordinates::new(-33.8688, 151.2093);
        assert_eq!(c.to_fixed_string(), "-33.8688, 151.2093");
    }

    #[test]
    fn test_parse() {
        let coords: Coordinates = "52.52, -13.405".parse().unwrap();
        assert_eq!(coords, Coordinates::new(52.52, -13.405));

        assert!("52.52".parse::<Coordinates>().is_err());
        assert!("north,13.4".parse::<Coordinates>().is_err());
    }
}
