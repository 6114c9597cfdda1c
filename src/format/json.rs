//! JSON output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::listings::{ListingHit, SearchFilters};
use serde::{Deserialize, Serialize};

/// Search results as printed by `search -f json` and served by
/// `/api/listings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub listings: Vec<ListingHit>,
    pub count: usize,
}

impl SearchResponse {
    pub fn new(listings: Vec<ListingHit>) -> Self {
        Self {
            count: listings.len(),
            listings,
        }
    }
}

/// JSON formatter - outputs results as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Listings with distances as JSON"
    }

    fn format(&self, hits: &[ListingHit], _filters: &SearchFilters) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SearchResponse::new(hits.to_vec()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::hits;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter
            .format(&hits(), &SearchFilters::default())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["count"], 2);

        let first = &parsed["listings"][0];
        assert_eq!(first["title"], "Clear PET bottles");
        assert_eq!(first["type"], "offering");
        assert_eq!(first["category"], "plastic");
        assert_eq!(first["distance_km"], 2.4);

        let second = &parsed["listings"][1];
        assert_eq!(second["category"], "other");
        assert!(second["distance_km"].is_null());
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
