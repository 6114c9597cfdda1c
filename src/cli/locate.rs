//! Locate command handler
//!
//! Acquires the current position and prints it with its address.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::position::{FixedPositionProvider, PositionSource};
use crate::geo::{get_current_location, GeocoderSource, LocationResult, OfflineGeocoder};
use clap::Args;
use std::time::Duration;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Output format (text or json)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Resolve this "lat,lng" instead of acquiring the current position
    #[arg(long, allow_hyphen_values = true)]
    pub at: Option<Coordinates>,

    /// Skip reverse geocoding and show coordinates only
    #[arg(long)]
    pub offline: bool,

    /// Give up after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Accept a cached fix up to this many seconds old
    #[arg(long)]
    pub max_age: Option<u64>,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<()> {
    let config = Config::load()?;

    let mut options = config.position_options();
    if let Some(timeout_ms) = args.timeout_ms {
        options.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(max_age) = args.max_age {
        options.maximum_age = Duration::from_secs(max_age);
    }

    let provider = match args.at {
        Some(coords) => {
            coords.validate()?;
            PositionSource::Fixed(FixedPositionProvider::new(coords))
        }
        None => config.position_source(),
    };
    let geocoder = if args.offline {
        GeocoderSource::Offline(OfflineGeocoder)
    } else {
        config.reverse_geocoder()
    };

    let result = get_current_location(&provider, &geocoder, &options).await?;
    println!("{}", render(&result, &args.format)?);

    Ok(())
}

fn render(result: &LocationResult, format: &str) -> Result<String> {
    match format.to_lowercase().as_str() {
        "json" => Ok(serde_json::to_string_pretty(result)?),
        "text" => {
            let mut output = format!("Coordinates: {}\nAddress: {}", result.coords, result.address);
            if result.address.is_fallback() {
                output.push_str(" (address lookup unavailable)");
            }
            Ok(output)
        }
        other => Err(Error::Config(format!("Unknown format: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeocodedAddress;

    fn result(address: GeocodedAddress) -> LocationResult {
        LocationResult {
            coords: Coordinates::new(52.52, 13.405),
            address,
        }
    }

    #[test]
    fn test_render_text() {
        let resolved = result(GeocodedAddress::Resolved("Berlin, Berlin, Germany".to_string()));
        assert_eq!(
            render(&resolved, "text").unwrap(),
            "Coordinates: (52.520000, 13.405000)\nAddress: Berlin, Berlin, Germany"
        );

        let fallback = result(GeocodedAddress::fallback(52.52, 13.405));
        assert!(render(&fallback, "text")
            .unwrap()
            .ends_with("52.5200, 13.4050 (address lookup unavailable)"));
    }

    #[test]
    fn test_render_json() {
        let output = render(&result(GeocodedAddress::fallback(52.52, 13.405)), "JSON").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["coords"]["lat"], 52.52);
        assert_eq!(parsed["address"]["quality"], "fallback");
    }

    #[test]
    fn test_render_unknown_format() {
        let err = render(&result(GeocodedAddress::fallback(0.0, 0.0)), "gpx").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
