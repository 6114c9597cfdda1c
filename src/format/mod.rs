//! Output formatters
//!
//! Provides trait-based output formatting for search results.

pub mod json;
pub mod text;

use crate::error::Result;
use crate::listings::{ListingHit, SearchFilters};
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format search results
    ///
    /// # Arguments
    /// * `hits` - Listings in display order
    /// * `filters` - The filters that produced them (for headers)
    fn format(&self, hits: &[ListingHit], filters: &SearchFilters) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "Listings with distances as JSON".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable text".to_string(),
        },
    ]
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::coord::Coordinates;
    use crate::listings::{Listing, ListingHit, ListingRow, ListingType};

    pub fn hits() -> Vec<ListingHit> {
        let near = ListingRow::new(ListingType::Offering, "Clear PET bottles", "Rinsed bottles")
            .with_category("plastic")
            .with_location(Coordinates::new(52.52, 13.405), "Mitte, Berlin, Germany");
        let far = ListingRow::new(ListingType::Offering, "Fabric scraps", "Cotton scraps");

        vec![
            ListingHit {
                listing: Listing::from(near),
                distance_km: Some(2.4),
            },
            ListingHit {
                listing: Listing::from(far),
                distance_km: None,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("gpx").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 2);
        assert!(formats.iter().any(|f| f.name == "json"));
        assert!(formats.iter().any(|f| f.name == "text"));
    }
}
