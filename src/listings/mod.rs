//! Listing search
//!
//! Composes `SearchFilters` into a query against a `ListingStore`:
//! - base policy: only active listings that offer material
//! - free text over title OR description, case-insensitive
//! - category equality, with `"all"` meaning no constraint
//! - radius search delegated to the store's remote procedure
//!
//! Every row handed back to callers is normalized so `category` is a
//! non-empty slug.

pub mod memory;
pub mod rest;

use crate::constants::search::{
    ACTIVE, ALL_CATEGORIES, DEFAULT_LIMIT, FALLBACK_CATEGORY, OFFERING,
};
use crate::coord::distance::{calculate_distance, format_distance};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;
use uuid::Uuid;

/// Whether a listing offers or seeks material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Offering,
    Seeking,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offering => OFFERING,
            Self::Seeking => "seeking",
        }
    }
}

/// Listing lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => ACTIVE,
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Category reference joined onto a listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub slug: Option<String>,
}

/// A listing row as the store returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: ListingType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Plain category column, when the store has one
    #[serde(default)]
    pub category: Option<String>,
    /// Joined category reference; may be null
    #[serde(default)]
    pub categories: Option<CategoryRef>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub location_lat: Option<f64>,
    #[serde(default)]
    pub location_lng: Option<f64>,
    #[serde(default)]
    pub location_address: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: ListingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl ListingRow {
    /// New active listing with a fresh id and no category or location
    pub fn new(kind: ListingType, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            user_id: None,
            kind,
            title: title.into(),
            description: description.into(),
            category: None,
            categories: None,
            quantity: None,
            unit: None,
            frequency: None,
            location_lat: None,
            location_lng: None,
            location_address: None,
            image_url: None,
            status: ListingStatus::Active,
            created_at: Some(Utc::now()),
            updated_at: None,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
        }
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.categories = Some(CategoryRef {
            slug: Some(slug.into()),
        });
        self
    }

    pub fn with_location(mut self, coords: Coordinates, address: impl Into<String>) -> Self {
        self.location_lat = Some(coords.lat);
        self.location_lng = Some(coords.lng);
        self.location_address = Some(address.into());
        self
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Category slug from the join, then the plain column
    pub fn category_slug(&self) -> Option<&str> {
        self.categories
            .as_ref()
            .and_then(|c| c.slug.as_deref())
            .filter(|s| !s.is_empty())
            .or_else(|| self.category.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn coords(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.location_lat?, self.location_lng?))
    }

    /// Value of a filterable column
    fn column(&self, column: Column) -> Option<String> {
        match column {
            Column::Type => Some(self.kind.as_str().to_string()),
            Column::Status => Some(self.status.as_str().to_string()),
            Column::Category => self
                .categories
                .as_ref()
                .and_then(|c| c.slug.clone())
                .filter(|s| !s.is_empty()),
            Column::Title => Some(self.title.clone()),
            Column::Description => Some(self.description.clone()),
            Column::CreatedAt => self.created_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A normalized listing handed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: ListingType,
    pub title: String,
    pub description: String,
    /// Always a non-empty slug; `"other"` when the row had none
    pub category: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub frequency: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_address: Option<String>,
    pub image_url: Option<String>,
    pub status: ListingStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        let category = row
            .category_slug()
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string();

        Self {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind,
            title: row.title,
            description: row.description,
            category,
            quantity: row.quantity,
            unit: row.unit,
            frequency: row.frequency,
            location_lat: row.location_lat,
            location_lng: row.location_lng,
            location_address: row.location_address,
            image_url: row.image_url,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            contact_name: row.contact_name,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
        }
    }
}

impl Listing {
    pub fn coords(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.location_lat?, self.location_lng?))
    }

    /// Distance from `center` in km, if the listing has coordinates
    pub fn distance_from(&self, center: Coordinates) -> Option<f64> {
        self.coords().map(|c| calculate_distance(center, c))
    }

    /// Address to show, falling back to the coordinates
    pub fn display_address(&self) -> String {
        match (&self.location_address, self.coords()) {
            (Some(address), _) if !address.trim().is_empty() => address.clone(),
            (_, Some(coords)) => coords.to_fixed_string(),
            _ => String::new(),
        }
    }
}

/// Caller-supplied search constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Free text matched against title or description
    #[serde(default)]
    pub query: Option<String>,
    /// Category slug; `"all"` imposes no constraint
    #[serde(default)]
    pub category: Option<String>,
    /// Search center
    #[serde(default)]
    pub location: Option<Coordinates>,
    /// Search radius in km; ignored without `location`
    #[serde(default)]
    pub radius: Option<f64>,
}

impl SearchFilters {
    /// Non-blank text query
    pub fn text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Category constraint, absent for `"all"` or blank
    pub fn category_constraint(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    }

    /// Center and radius, only when both are present and the radius is
    /// a positive number
    pub fn geo_constraint(&self) -> Option<(Coordinates, f64)> {
        let center = self.location?;
        let radius = self.radius?;
        (radius.is_finite() && radius > 0.0).then_some((center, radius))
    }

    /// Reject malformed filters before any store round trip
    pub fn validate(&self) -> Result<()> {
        if let Some(location) = &self.location {
            location.validate()?;
        }
        if let Some(radius) = self.radius {
            if radius.is_nan() || radius < 0.0 {
                return Err(Error::InvalidRadius(format!("Radius {} must not be negative", radius)));
            }
        }
        Ok(())
    }
}

/// Filterable listing columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Type,
    Status,
    Category,
    Title,
    Description,
    CreatedAt,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Status => "status",
            Self::Category => "categories.slug",
            Self::Title => "title",
            Self::Description => "description",
            Self::CreatedAt => "created_at",
        }
    }
}

/// One predicate of a row query
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals value
    Eq(Column, String),
    /// Any of the columns contains the needle, case-insensitive
    AnyContains(Vec<Column>, String),
}

impl Filter {
    pub fn matches(&self, row: &ListingRow) -> bool {
        match self {
            Self::Eq(column, value) => row.column(*column).as_deref() == Some(value.as_str()),
            Self::AnyContains(columns, needle) => {
                let needle = needle.to_lowercase();
                columns.iter().any(|column| {
                    row.column(*column)
                        .map(|v| v.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
        }
    }
}

/// Row ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: Column,
    pub descending: bool,
}

/// A row query against the listing store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl ListingQuery {
    /// Base policy plus the text and category constraints of `filters`
    pub fn for_search(filters: &SearchFilters) -> Self {
        let mut query = Self::default()
            .where_eq(Column::Type, OFFERING)
            .where_eq(Column::Status, ACTIVE);

        if let Some(text) = filters.text() {
            query = query.where_any_contains(vec![Column::Title, Column::Description], text);
        }
        if let Some(category) = filters.category_constraint() {
            query = query.where_eq(Column::Category, category);
        }
        query
    }

    pub fn where_eq(mut self, column: Column, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn where_any_contains(mut self, columns: Vec<Column>, needle: impl Into<String>) -> Self {
        self.filters.push(Filter::AnyContains(columns, needle.into()));
        self
    }

    pub fn order_desc(mut self, column: Column) -> Self {
        self.order = Some(Order {
            column,
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a row passes every filter
    pub fn matches(&self, row: &ListingRow) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

/// External listing data store
pub trait ListingStore: Send + Sync {
    /// Run a row query
    fn select(&self, query: &ListingQuery) -> impl Future<Output = Result<Vec<ListingRow>>> + Send;

    /// The store's radius procedure: rows within `radius_km` of `center`
    fn within_radius(
        &self,
        center: Coordinates,
        radius_km: f64,
    ) -> impl Future<Output = Result<Vec<ListingRow>>> + Send;
}

/// Fetch the listings matching `filters`
///
/// With a center and radius the store's radius procedure does the geo scan
/// and the base, text and category filters are re-applied to its rows here.
/// Otherwise the newest matching rows are fetched, capped at 50.
pub async fn fetch_listings<S>(store: &S, filters: &SearchFilters) -> Result<Vec<Listing>>
where
    S: ListingStore,
{
    filters.validate()?;
    let query = ListingQuery::for_search(filters);

    let rows = match filters.geo_constraint() {
        Some((center, radius_km)) => {
            let rows = store.within_radius(center, radius_km).await?;
            let total = rows.len();
            let rows: Vec<_> = rows.into_iter().filter(|row| query.matches(row)).collect();
            debug!(
                "Radius search {} km around {}: {} of {} rows match filters",
                radius_km,
                center,
                rows.len(),
                total
            );
            rows
        }
        None => {
            let query = query.order_desc(Column::CreatedAt).limit(DEFAULT_LIMIT);
            let rows = store.select(&query).await?;
            debug!("Listing query returned {} rows", rows.len());
            rows
        }
    };

    Ok(rows.into_iter().map(Listing::from).collect())
}

/// A search result with its distance from the search center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingHit {
    #[serde(flatten)]
    pub listing: Listing,
    pub distance_km: Option<f64>,
}

impl ListingHit {
    /// `"2.4km away"`, `"300m away"`, or None without a distance
    pub fn distance_display(&self) -> Option<String> {
        self.distance_km.map(format_distance)
    }
}

/// Fetch listings and annotate each with its distance from the center
///
/// With a center, hits are ordered nearest first and listings without
/// coordinates go last.
pub async fn search_listings<S>(store: &S, filters: &SearchFilters) -> Result<Vec<ListingHit>>
where
    S: ListingStore,
{
    let listings = fetch_listings(store, filters).await?;

    let mut hits: Vec<ListingHit> = listings
        .into_iter()
        .map(|listing| {
            let distance_km = filters.location.and_then(|c| listing.distance_from(c));
            ListingHit { listing, distance_km }
        })
        .collect();

    if filters.location.is_some() {
        hits.sort_by(|a, b| match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    Ok(hits)
}
