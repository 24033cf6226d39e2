//! Nearby command handler
//!
//! Runs the configured proximity search around a position.

use crate::cli::{LocationArgs, OutputArgs};
use crate::config::Config;
use crate::error::Result;
use crate::format::PlaceReport;
use crate::search::{SearchCoordinator, SearchSettings};
use clap::Args;

/// Nearby command arguments
#[derive(Args)]
pub struct NearbyArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Override the configured nearby query
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Maximum number of places
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the nearby command
pub async fn run(args: NearbyArgs) -> Result<()> {
    if args.output.list_formats_requested() {
        return Ok(());
    }

    let config = Config::load()?;
    let backend = config.geocoder()?;
    let center = args.location.resolve(&backend).await?;

    let mut settings = SearchSettings::from(&config);
    if let Some(query) = args.query.filter(|q| !q.trim().is_empty()) {
        settings.nearby_query = query;
    }
    if let Some(limit) = args.limit {
        settings.max_results = limit;
    }

    let title = format!("Nearby \"{}\"", settings.nearby_query);
    let coordinator = SearchCoordinator::new(backend, settings);
    let results = coordinator.refresh_nearby(center).await;

    args.output
        .emit(&PlaceReport::from_results(title, Some(center), &results))
}
