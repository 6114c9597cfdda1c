//! ecobloom: geolocation and listing search for a materials exchange
//!
//! A library and CLI for the proximity side of a marketplace where people
//! offer and seek waste materials.
//!
//! ## Features
//!
//! - Position acquisition behind a `PositionProvider` with timeout and
//!   max-age handling
//! - Reverse geocoding that always yields a displayable address
//! - Great-circle distance with rounded, human-readable display
//! - Listing search composing text, category and radius filters against a
//!   PostgREST store
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use ecobloom::coord::distance::{calculate_distance, format_distance};
//! use ecobloom::coord::Coordinates;
//!
//! let berlin = Coordinates::new(52.5200, 13.4050);
//! let potsdam = Coordinates::new(52.3906, 13.0645);
//!
//! let km = calculate_distance(berlin, potsdam);
//! println!("Potsdam is {}", format_distance(km));
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod detect;
pub mod error;
pub mod format;
pub mod geo;
pub mod listings;
pub mod server;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, LocationError, Result};
pub use geo::{GeocodedAddress, LocationResult};
pub use listings::{Listing, ListingHit, SearchFilters};
