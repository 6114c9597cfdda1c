//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod detect;
pub mod distance;
pub mod locate;
pub mod search;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Materials exchange geolocation and listing search
#[derive(Parser)]
#[command(name = "ecobloom")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current position and its address
    Locate(locate::LocateArgs),

    /// Distance between two coordinates
    Distance(distance::DistanceArgs),

    /// Search listings
    Search(search::SearchArgs),

    /// Query the material detection backend
    Detect(detect::DetectArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Install the tracing subscriber
///
/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Locate(args) => locate::run(args).await,
        Commands::Distance(args) => distance::run(args),
        Commands::Search(args) => search::run(args).await,
        Commands::Detect(args) => detect::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}
