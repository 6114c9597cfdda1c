//! Detect command handler
//!
//! Checks the material detection backend or sends it an image.

use crate::config::Config;
use crate::detect::{DetectionClient, MaterialDetection};
use crate::error::{Error, Result};
use clap::Args;
use std::path::PathBuf;

/// Detect command arguments
#[derive(Args)]
pub struct DetectArgs {
    /// File holding the image as a `data:` URL
    #[arg(required_unless_present = "health")]
    pub image: Option<PathBuf>,

    /// Only report whether the backend is healthy
    #[arg(long)]
    pub health: bool,

    /// Backend base URL (overrides detection.url)
    #[arg(long)]
    pub url: Option<String>,

    /// Print the raw detection as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the detect command
pub async fn run(args: DetectArgs) -> Result<()> {
    let config = Config::load()?;
    let client = DetectionClient::new(args.url.unwrap_or(config.detection.url));

    if args.health {
        if client.is_healthy().await {
            println!("Detection backend is healthy");
            return Ok(());
        }
        return Err(Error::Detection("Detection backend is not available".to_string()));
    }

    let Some(path) = args.image else {
        return Err(Error::Detection("No image given".to_string()));
    };
    let image = read_data_url(&std::fs::read_to_string(&path)?)?;
    let detection = client.analyze(&image).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        println!("{}", describe(&detection));
    }
    Ok(())
}

/// Validate the contents of an image file
fn read_data_url(contents: &str) -> Result<String> {
    let contents = contents.trim();
    if contents.starts_with("data:image/") && contents.contains(";base64,") {
        Ok(contents.to_string())
    } else {
        Err(Error::Detection(
            "Expected a data:image/...;base64,... URL".to_string(),
        ))
    }
}

fn describe(detection: &MaterialDetection) -> String {
    let mut lines = vec![
        format!("{} ({})", detection.title, detection.material_type),
        format!("  {}", detection.description),
        format!("  Category: {}", detection.suggested_category),
        format!(
            "  Recyclable: {}",
            if detection.is_recyclable { "yes" } else { "no" }
        ),
        format!("  Confidence: {:.0}%", detection.confidence * 100.0),
    ];
    if let Some(weight) = &detection.estimated_weight {
        lines.push(format!("  Estimated weight: {}", weight));
    }
    lines.join("\n")
}
