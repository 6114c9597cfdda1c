//! HTTP server for ecobloom
//!
//! Provides the JSON API over listing search, distance and reverse
//! geocoding.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::listings::ListingStore;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Server configuration
/// * `store` - Listing store answering search requests
///
/// # Returns
/// Never returns unless the server shuts down
pub async fn run<S>(config: Config, store: S) -> Result<()>
where
    S: ListingStore + 'static,
{
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let geocoder = config.reverse_geocoder();
    let state = Arc::new(AppState::new(store, geocoder));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
