//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions. Arguments
//! shared by several commands (where to search, how to print) live here.

pub mod address;
pub mod config;
pub mod favorites;
pub mod nearby;
pub mod search;
pub mod serve;
pub mod track;

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, PlaceReport};
use crate::geo::get_ip_locator;
use crate::geo::nominatim::NominatimBackend;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Nearby place search, address lookup and favorites
#[derive(Parser)]
#[command(name = "place-finder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find places of the configured kind near a position
    Nearby(nearby::NearbyArgs),

    /// Free-text place search around a position
    Search(search::SearchArgs),

    /// Reverse geocode a position to an address
    Address(address::AddressArgs),

    /// Follow a stream of position fixes
    Track(track::TrackArgs),

    /// View and manage favorites
    Favorites(favorites::FavoritesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),
}

/// Where a command should look
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Latitude
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Named location (geocoded)
    #[arg(long, conflicts_with_all = ["lat", "lng", "here"])]
    pub location: Option<String>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lng", "location"])]
    pub here: bool,
}

impl LocationArgs {
    /// Resolve the arguments to a validated coordinate
    pub async fn resolve(&self, geocoder: &NominatimBackend) -> Result<Coordinate> {
        let center = if self.here {
            let location = get_ip_locator().locate().await?;
            eprintln!("Using IP location: {}", location.display_name);
            location.coordinate()
        } else if let Some(query) = &self.location {
            match geocoder.geocode(query).await? {
                Some(location) => {
                    eprintln!("Geocoded to: {}", location.display_name);
                    location.coordinate()
                }
                None => {
                    return Err(Error::Geocoding(format!("Could not geocode '{}'", query)));
                }
            }
        } else if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            Coordinate::new(lat, lng)
        } else {
            return Err(Error::InvalidCoordinates(
                "No location specified. Use --lat/--lng, --location, or --here".to_string(),
            ));
        };

        center.validate()?;
        Ok(center)
    }
}

/// How a command prints place listings
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format (json, text, gpx)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

impl OutputArgs {
    /// Print the format list if requested; returns true when it did
    pub fn list_formats_requested(&self) -> bool {
        if self.list_formats {
            println!("Available output formats:");
            for format in available_formats() {
                println!("  {:6} - {}", format.name, format.description);
            }
        }
        self.list_formats
    }

    /// Render a report and write it to the chosen destination
    pub fn emit(&self, report: &PlaceReport) -> Result<()> {
        let formatter = get_formatter(&self.format)
            .ok_or_else(|| Error::Config(format!("Unknown format: {}", self.format)))?;
        let output = formatter.format(report)?;

        if let Some(path) = &self.output {
            std::fs::write(path, &output)?;
            eprintln!("Output written to {}", path);
        } else {
            println!("{}", output);
        }
        Ok(())
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides `default_level`
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.command {
        Commands::Serve(_) | Commands::Track(_) => "info",
        _ => "warn",
    };
    init_logging(level);

    match cli.command {
        Commands::Nearby(args) => nearby::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Address(args) => address::run(args).await,
        Commands::Track(args) => track::run(args).await,
        Commands::Favorites(args) => favorites::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Serve(args) => serve::run(args).await,
    }
}
