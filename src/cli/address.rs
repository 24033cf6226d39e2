//! Address command handler

use crate::cli::LocationArgs;
use crate::config::Config;
use crate::constants::labels::ADDRESS_NOT_FOUND;
use crate::error::Result;
use crate::geo::Geocoder;
use crate::tracker::format_address;
use clap::Args;

/// Address command arguments
#[derive(Args)]
pub struct AddressArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print the address components as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the address command
pub async fn run(args: AddressArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = config.geocoder()?;
    let coordinate = args.location.resolve(&geocoder).await?;

    let placemark = geocoder.reverse_geocode(coordinate).await?;

    if args.json {
        let body = serde_json::json!({
            "coordinate": coordinate,
            "placemark": placemark,
            "address": placemark.as_ref().map(format_address),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        match placemark {
            Some(placemark) => println!("{}", format_address(&placemark)),
            None => println!("{}", ADDRESS_NOT_FOUND),
        }
    }

    Ok(())
}
