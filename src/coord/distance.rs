//! Great-circle distance
//!
//! Haversine distance on a sphere of radius 6371 km, rounded to 0.1 km for
//! display, plus the "500m away" / "12.3km away" formatting.

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinates;

/// Unrounded Haversine distance in kilometers
///
/// The longitude difference is used as-is: `sin²(Δλ/2)` is periodic, so
/// points either side of the antimeridian come out close together without
/// any wraparound correction.
pub fn haversine_km(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Clamp guards sqrt(1 - a) against a drifting a hair above 1.0
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two points in kilometers, rounded to 1 decimal place
pub fn calculate_distance(p1: Coordinates, p2: Coordinates) -> f64 {
    round_km(haversine_km(p1, p2))
}

/// Round a distance to one decimal place of kilometers
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Format a distance for display
///
/// Under 1 km renders as whole meters (`"500m away"`), otherwise as the
/// already-rounded kilometer value (`"12.3km away"`).
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m away", (km * 1000.0).round())
    } else {
        format!("{}km away", km)
    }
}

/// Check whether `point` lies within `radius_km` of `center`
pub fn is_within_radius(point: Coordinates, center: Coordinates, radius_km: f64) -> bool {
    haversine_km(point, center) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const NEW_YORK: Coordinates = Coordinates { lat: 40.7128, lng: -74.0060 };
    const LOS_ANGELES: Coordinates = Coordinates { lat: 34.0522, lng: -118.2437 };

    #[test]
    fn test_same_point_is_zero() {
        for c in [
            NEW_YORK,
            LOS_ANGELES,
            Coordinates::new(0.0, 0.0),
            Coordinates::new(90.0, 0.0),
            Coordinates::new(-45.5, 179.99),
        ] {
            assert_eq!(calculate_distance(c, c), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (NEW_YORK, LOS_ANGELES),
            (Coordinates::new(51.5074, -0.1278), Coordinates::new(48.8566, 2.3522)),
            (Coordinates::new(-33.8688, 151.2093), Coordinates::new(35.6762, 139.6503)),
        ];
        for (a, b) in pairs {
            assert_abs_diff_eq!(calculate_distance(a, b), calculate_distance(b, a), epsilon = 0.1);
        }
    }

    #[test]
    fn test_new_york_to_los_angeles() {
        let km = calculate_distance(NEW_YORK, LOS_ANGELES);
        assert_abs_diff_eq!(km, 3936.0, epsilon = 5.0);
    }

    #[test]
    fn test_result_has_one_decimal() {
        let km = calculate_distance(NEW_YORK, Coordinates::new(40.8128, -74.0060));
        assert_abs_diff_eq!(km * 10.0, (km * 10.0).round(), epsilon = 1e-9);
        assert_abs_diff_eq!(km, 11.1, epsilon = 1e-9);
    }

    #[test]
    fn test_antimeridian_is_short() {
        let east = Coordinates::new(0.0, 179.9);
        let west = Coordinates::new(0.0, -179.9);

        // 0.2 degrees of longitude at the equator, not half the planet
        let km = calculate_distance(east, west);
        assert_abs_diff_eq!(km, 22.2, epsilon = 0.1);
        assert_eq!(km, calculate_distance(west, east));
    }

    #[test]
    fn test_poles() {
        let north = Coordinates::new(90.0, 0.0);
        let south = Coordinates::new(-90.0, 0.0);

        // Half the circumference: pi * R
        assert_abs_diff_eq!(calculate_distance(north, south), 20015.1, epsilon = 0.1);

        // Longitude is meaningless at the pole itself
        assert_eq!(calculate_distance(north, Coordinates::new(90.0, 120.0)), 0.0);
    }

    #[test]
    fn test_never_negative() {
        let far = calculate_distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        assert!(far > 0.0);
        assert_abs_diff_eq!(far, 20015.1, epsilon = 0.1);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.5), "500m away");
        assert_eq!(format_distance(0.0), "0m away");
        assert_eq!(format_distance(0.9996), "1000m away");
        assert_eq!(format_distance(round_km(12.34)), "12.3km away");
        assert_eq!(format_distance(1.0), "1km away");
        assert_eq!(format_distance(3935.7), "3935.7km away");
    }

    #[test]
    fn test_is_within_radius() {
        let center = NEW_YORK;

        assert!(is_within_radius(center, center, 1.0));

        // ~440m north
        let inside = Coordinates::new(40.7128 + 0.004, -74.0060);
        assert!(is_within_radius(inside, center, 1.0));

        // ~2.2km north
        let outside = Coordinates::new(40.7128 + 0.02, -74.0060);
        assert!(!is_within_radius(outside, center, 1.0));
    }
}
