//! Serve command handler
//!
//! Starts the HTTP server in foreground mode.

use crate::config::Config;
use crate::error::Result;
use crate::listings::memory::{demo_rows, MemoryListingStore};
use crate::server;
use clap::Args;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Serve the built-in demo listings instead of the configured store
    #[arg(long)]
    pub demo: bool,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    // Load and optionally override config
    let mut config = Config::load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(
        "Starting ecobloom server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr()
    );

    if args.demo {
        let store = MemoryListingStore::new(demo_rows());
        info!("Serving {} demo listings", store.len());
        server::run(config, store).await
    } else {
        let store = config.listing_store()?;
        server::run(config, store).await
    }
}
