//! In-process listing store
//!
//! Evaluates `ListingQuery` and the radius procedure over a fixed set of
//! rows. Backs `serve --demo` and the composer tests.

use crate::coord::distance::{haversine_km, is_within_radius};
use crate::coord::Coordinates;
use crate::error::Result;
use crate::listings::{Column, ListingQuery, ListingRow, ListingStore};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Listing store backed by a vector of rows
#[derive(Debug, Default)]
pub struct MemoryListingStore {
    rows: Vec<ListingRow>,
    select_calls: AtomicUsize,
    radius_calls: AtomicUsize,
}

impl MemoryListingStore {
    pub fn new(rows: Vec<ListingRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Number of row queries served so far
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::Relaxed)
    }

    /// Number of radius procedure calls served so far
    pub fn radius_calls(&self) -> usize {
        self.radius_calls.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ListingStore for MemoryListingStore {
    async fn select(&self, query: &ListingQuery) -> Result<Vec<ListingRow>> {
        self.select_calls.fetch_add(1, Ordering::Relaxed);

        let mut rows: Vec<ListingRow> = self
            .rows
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ordering = match order.column {
                    Column::CreatedAt => a.created_at.cmp(&b.created_at),
                    Column::Title => a.title.cmp(&b.title),
                    _ => std::cmp::Ordering::Equal,
                };
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn within_radius(&self, center: Coordinates, radius_km: f64) -> Result<Vec<ListingRow>> {
        self.radius_calls.fetch_add(1, Ordering::Relaxed);

        let mut rows: Vec<(f64, ListingRow)> = self
            .rows
            .iter()
            .filter_map(|row| {
                let coords = row.coords()?;
                is_within_radius(coords, center, radius_km)
                    .then(|| (haversine_km(center, coords), row.clone()))
            })
            .collect();

        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}

/// A small set of listings around Berlin for demos
pub fn demo_rows() -> Vec<ListingRow> {
    use crate::listings::{ListingStatus, ListingType};

    vec![
        ListingRow::new(ListingType::Offering, "Clear PET bottles", "About 40 kg of rinsed PET bottles")
            .with_category("plastic")
            .with_location(Coordinates::new(52.5200, 13.4050), "Mitte, Berlin, Germany"),
        ListingRow::new(ListingType::Offering, "Office paper", "Shredded office paper, bagged")
            .with_category("paper")
            .with_location(Coordinates::new(52.4875, 13.4250), "Neukölln, Berlin, Germany"),
        ListingRow::new(ListingType::Offering, "Aluminium offcuts", "Mixed aluminium sheet offcuts")
            .with_category("metal")
            .with_location(Coordinates::new(52.3906, 13.0645), "Potsdam, Brandenburg, Germany"),
        ListingRow::new(ListingType::Offering, "Glass jars", "Jam jars without lids")
            .with_category("glass")
            .with_location(Coordinates::new(53.5511, 9.9937), "Hamburg, Germany"),
        ListingRow::new(ListingType::Seeking, "Looking for cardboard", "Need boxes for moving")
            .with_category("paper")
            .with_location(Coordinates::new(52.5150, 13.3900), "Mitte, Berlin, Germany"),
        ListingRow::new(ListingType::Offering, "Old monitors", "Three broken LCD monitors")
            .with_category("electronics")
            .with_status(ListingStatus::Completed)
            .with_location(Coordinates::new(52.5300, 13.4100), "Prenzlauer Berg, Berlin, Germany"),
        ListingRow::new(ListingType::Offering, "Fabric scraps", "Cotton scraps from a tailor"),
    ]
}
