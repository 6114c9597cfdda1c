//! Human-readable text output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::listings::{ListingHit, SearchFilters};
use std::fmt::Write;

/// Text formatter - one block per listing
pub struct TextFormatter;

impl TextFormatter {
    fn header(filters: &SearchFilters, count: usize) -> String {
        let mut parts = Vec::new();
        if let Some(text) = filters.text() {
            parts.push(format!("\"{}\"", text));
        }
        if let Some(category) = filters.category_constraint() {
            parts.push(format!("category {}", category));
        }
        match (filters.geo_constraint(), filters.location) {
            (Some((center, radius)), _) => {
                parts.push(format!("within {} km of {}", radius, center.to_fixed_string()))
            }
            (None, Some(center)) => parts.push(format!("near {}", center.to_fixed_string())),
            (None, None) => {}
        }

        let noun = if count == 1 { "listing" } else { "listings" };
        if parts.is_empty() {
            format!("{} {}", count, noun)
        } else {
            format!("{} {} ({})", count, noun, parts.join(", "))
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, hits: &[ListingHit], filters: &SearchFilters) -> Result<String> {
        let mut output = String::new();
        let _ = writeln!(output, "{}", Self::header(filters, hits.len()));

        for hit in hits {
            let listing = &hit.listing;
            let _ = writeln!(output);
            let _ = writeln!(output, "{} [{}]", listing.title, listing.category);

            if let (Some(quantity), Some(unit)) = (listing.quantity, &listing.unit) {
                let _ = writeln!(output, "  Quantity: {} {}", quantity, unit);
            }

            let address = listing.display_address();
            match (address.is_empty(), hit.distance_display()) {
                (false, Some(distance)) => {
                    let _ = writeln!(output, "  Location: {} ({})", address, distance);
                }
                (false, None) => {
                    let _ = writeln!(output, "  Location: {}", address);
                }
                (true, Some(distance)) => {
                    let _ = writeln!(output, "  {}", distance);
                }
                (true, None) => {}
            }

            if let Some(id) = listing.id {
                let _ = writeln!(output, "  Id: {}", id);
            }
        }

        Ok(output)
    }
}
