//! Track command handler
//!
//! Feeds position fixes into a `LocationTracker` and prints the framed
//! nearby results each time a fix is accepted. Fixes come from stdin, one
//! "lat,lng[,altitude]" per line, or from periodic IP geolocation.

use crate::cli::OutputArgs;
use crate::config::Config;
use crate::error::Result;
use crate::format::PlaceReport;
use crate::geo::ip_location::IpLocator;
use crate::geo::nominatim::NominatimBackend;
use crate::search::{SearchCoordinator, SearchSettings};
use crate::tracker::{LineSource, LocationSource, LocationTracker, PositionUpdate, TrackerSettings};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{debug, info};

/// Track command arguments
#[derive(Args)]
pub struct TrackArgs {
    /// Poll IP geolocation instead of reading fixes from stdin
    #[arg(long)]
    pub ip: bool,

    /// Seconds between IP polls
    #[arg(long, requires = "ip")]
    pub interval: Option<u64>,

    /// Override the movement threshold in meters
    #[arg(long)]
    pub threshold: Option<f64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

type Tracker = LocationTracker<NominatimBackend, NominatimBackend>;

/// Run the track command
pub async fn run(args: TrackArgs) -> Result<()> {
    if args.output.list_formats_requested() {
        return Ok(());
    }

    let config = Config::load()?;
    let coordinator = Arc::new(SearchCoordinator::new(
        config.geocoder()?,
        SearchSettings::from(&config),
    ));

    let mut settings = TrackerSettings::from(&config);
    if let Some(threshold) = args.threshold {
        settings.movement_threshold_meters = threshold.max(0.0);
    }

    let tracker = LocationTracker::new(coordinator, Arc::new(config.geocoder()?), settings);

    let outcome = if args.ip {
        let every = args
            .interval
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or_else(|| config.ip_poll_interval());
        info!("Polling IP location every {}s", every.as_secs());
        follow(&tracker, IpLocator::poll(every), &args.output).await
    } else {
        let source = LineSource::new(BufReader::new(tokio::io::stdin()));
        follow(&tracker, source, &args.output).await
    };

    tracker.stop();
    outcome
}

/// Consume fixes until the source ends or Ctrl-C
async fn follow<S: LocationSource>(tracker: &Tracker, mut source: S, output: &OutputArgs) -> Result<()> {
    loop {
        let fix = tokio::select! {
            fix = source.next_fix() => fix,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                return Ok(());
            }
        };

        let Some(fix) = fix else {
            return Ok(());
        };

        match tracker.on_position_update(fix) {
            PositionUpdate::Accepted(tasks) => {
                tasks.join().await;
                print_update(tracker, output)?;
            }
            PositionUpdate::Discarded { moved_meters } => {
                debug!("Ignored fix {:.1} m from current position", moved_meters);
            }
        }
    }
}

fn print_update(tracker: &Tracker, output: &OutputArgs) -> Result<()> {
    let state = tracker.state();
    let results = tracker.coordinator().latest();

    if let Some(position) = state.last_accepted_position {
        eprintln!("Position: {}", position);
    }
    eprintln!("Address: {}", state.current_address);
    eprintln!("{}", state.altitude_label());

    let title = format!("Nearby \"{}\"", tracker.coordinator().settings().nearby_query);
    output.emit(&PlaceReport::from_results(
        title,
        state.last_accepted_position,
        &results,
    ))
}
