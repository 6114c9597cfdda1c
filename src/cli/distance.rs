//! Distance command handler

use crate::coord::distance::{calculate_distance, format_distance};
use crate::coord::Coordinates;
use crate::error::Result;
use clap::Args;

/// Distance command arguments
#[derive(Args)]
pub struct DistanceArgs {
    /// Start point as "lat,lng"
    #[arg(allow_hyphen_values = true)]
    pub from: Coordinates,

    /// End point as "lat,lng"
    #[arg(allow_hyphen_values = true)]
    pub to: Coordinates,

    /// Print only the kilometer value
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Run the distance command
pub fn run(args: DistanceArgs) -> Result<()> {
    println!("{}", describe(args.from, args.to, args.quiet)?);
    Ok(())
}

fn describe(from: Coordinates, to: Coordinates, quiet: bool) -> Result<String> {
    from.validate()?;
    to.validate()?;

    let km = calculate_distance(from, to);
    if quiet {
        Ok(km.to_string())
    } else {
        Ok(format!("{} km ({})", km, format_distance(km)))
    }
}
