//! Search command handler
//!
//! Runs a listing search and prints the results with per-listing
//! distance.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::nominatim::NominatimBackend;
use crate::geo::position::get_current_position;
use crate::listings::memory::{demo_rows, MemoryListingStore};
use crate::listings::{search_listings, SearchFilters};
use clap::Args;
use tracing::info;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Free text matched against title and description
    pub query: Option<String>,

    /// Category slug ("all" for any)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Search around a place name or "lat,lng"
    #[arg(long, conflicts_with = "here", allow_hyphen_values = true)]
    pub near: Option<String>,

    /// Search around the current position
    #[arg(long)]
    pub here: bool,

    /// Radius in km around the search center (0 sorts by distance only)
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Search the built-in demo listings instead of the configured store
    #[arg(long)]
    pub demo: bool,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;

    let format = args.format.clone().unwrap_or_else(|| config.search.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let location = resolve_center(&args, &config).await?;
    let filters = build_filters(&args, location, config.search.radius_km);

    let hits = if args.demo {
        search_listings(&MemoryListingStore::new(demo_rows()), &filters).await?
    } else {
        search_listings(&config.listing_store()?, &filters).await?
    };

    println!("{}", formatter.format(&hits, &filters)?);
    Ok(())
}

/// Search center from `--here` or `--near`
async fn resolve_center(args: &SearchArgs, config: &Config) -> Result<Option<Coordinates>> {
    if args.here {
        let coords =
            get_current_position(&config.position_source(), &config.position_options()).await?;
        info!("Using current position {}", coords);
        return Ok(Some(coords));
    }

    match &args.near {
        Some(place) => resolve_place(place, &config.geocoder()).await.map(Some),
        None => Ok(None),
    }
}

/// A literal "lat,lng" or a place name to forward geocode
async fn resolve_place(place: &str, geocoder: &NominatimBackend) -> Result<Coordinates> {
    if let Ok(coords) = place.parse::<Coordinates>() {
        coords.validate()?;
        return Ok(coords);
    }

    match geocoder.geocode(place).await? {
        Some(location) => {
            info!("Geocoded '{}' to {}", place, location.display_name);
            Ok(location.coords())
        }
        None => Err(Error::Geocoding(format!("Could not geocode '{}'", place))),
    }
}

/// Filters for the search; the radius falls back to the configured
/// default only when there is a center to apply it to
fn build_filters(
    args: &SearchArgs,
    location: Option<Coordinates>,
    default_radius: f64,
) -> SearchFilters {
    let radius = match (args.radius, location) {
        (Some(radius), _) => Some(radius),
        (None, Some(_)) => Some(default_radius),
        (None, None) => None,
    };

    SearchFilters {
        query: args.query.clone(),
        category: args.category.clone(),
        location,
        radius,
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:<6} - {}", format.name, format.description);
    }
}
