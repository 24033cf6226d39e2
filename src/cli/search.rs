//! Search command handler
//!
//! Free-text place search. An empty query behaves like `nearby`.

use crate::cli::{LocationArgs, OutputArgs};
use crate::config::Config;
use crate::coord::Span;
use crate::error::Result;
use crate::format::PlaceReport;
use crate::search::{SearchCoordinator, SearchSettings};
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Search text (may be empty)
    pub query: Vec<String>,

    #[command(flatten)]
    pub location: LocationArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.output.list_formats_requested() {
        return Ok(());
    }

    let config = Config::load()?;
    let backend = config.geocoder()?;
    let center = args.location.resolve(&backend).await?;

    let query = args.query.join(" ");
    let settings = SearchSettings::from(&config);
    let title = if query.trim().is_empty() {
        format!("Nearby \"{}\"", settings.nearby_query)
    } else {
        format!("Search \"{}\"", query.trim())
    };

    let coordinator = SearchCoordinator::new(backend, settings);
    let results = coordinator
        .search_around(
            &query,
            Some(center),
            Span::uniform(config.tracking.default_span_degrees),
        )
        .await;

    args.output
        .emit(&PlaceReport::from_results(title, Some(center), &results))
}
