//! PostgREST listing store
//!
//! Talks to the hosted listing database over its REST interface: row
//! queries against `/rest/v1/listings` and the radius procedure at
//! `/rest/v1/rpc/listings_within_radius`. Rows are joined with their
//! category slug via `select=*,categories(slug)`.

use crate::constants::search::RADIUS_PROCEDURE;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::listings::{Column, Filter, ListingQuery, ListingRow, ListingStore};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const SELECT: &str = "*,categories(slug)";
/// Inner embed so `categories.slug` filters drop non-matching rows
const SELECT_BY_CATEGORY: &str = "*,categories!inner(slug)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Listing store reached over PostgREST
#[derive(Debug, Clone)]
pub struct RestListingStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Arguments of the radius procedure
#[derive(Debug, Serialize)]
struct RadiusArgs {
    lat: f64,
    lng: f64,
    radius_km: f64,
}

/// Quote a value for use inside a PostgREST `or=(...)` list
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Escape LIKE metacharacters so the needle matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn encode_filter(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, value) => (column.as_str().to_string(), format!("eq.{}", value)),
        Filter::AnyContains(columns, needle) => {
            let pattern = quote(&format!("*{}*", escape_like(needle)));
            let parts: Vec<String> = columns
                .iter()
                .map(|c| format!("{}.ilike.{}", c.as_str(), pattern))
                .collect();
            ("or".to_string(), format!("({})", parts.join(",")))
        }
    }
}

impl RestListingStore {
    /// Create a store for the project at `base_url` using `api_key`
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Full URL of a row query
    pub fn select_url(&self, query: &ListingQuery) -> String {
        let by_category = query
            .filters
            .iter()
            .any(|f| matches!(f, Filter::Eq(Column::Category, _)));
        let select = if by_category { SELECT_BY_CATEGORY } else { SELECT };

        let mut params = vec![("select".to_string(), select.to_string())];
        params.extend(query.filters.iter().map(encode_filter));

        if let Some(order) = query.order {
            let direction = if order.descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{}", order.column.as_str(), direction)));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}/rest/v1/listings?{}", self.base_url, query_string)
    }

    fn rpc_url(&self) -> String {
        format!(
            "{}/rest/v1/rpc/{}?select={}",
            self.base_url,
            RADIUS_PROCEDURE,
            urlencoding::encode(SELECT)
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
    }

    async fn rows(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Vec<ListingRow>> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::data_access(format!("Failed to fetch {}", what), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Listing store returned {} for {}: {}", status, what, body);
            return Err(Error::data_access_msg(format!(
                "Listing store returned {} for {}: {}",
                status, what, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::data_access(format!("Failed to parse {}", what), e))
    }
}

impl ListingStore for RestListingStore {
    async fn select(&self, query: &ListingQuery) -> Result<Vec<ListingRow>> {
        let url = self.select_url(query);
        debug!("Listing query: {}", url);
        self.rows(self.client.get(&url), "listings").await
    }

    async fn within_radius(&self, center: Coordinates, radius_km: f64) -> Result<Vec<ListingRow>> {
        let args = RadiusArgs {
            lat: center.lat,
            lng: center.lng,
            radius_km,
        };
        debug!("Calling {} with {:?}", RADIUS_PROCEDURE, args);
        self.rows(self.client.post(self.rpc_url()).json(&args), "listings with radius")
            .await
    }
}
