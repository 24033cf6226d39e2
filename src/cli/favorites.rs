//! Favorites command handler
//!
//! List, toggle and remove bookmarked places.

use crate::cli::OutputArgs;
use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::Result;
use crate::favorites::FavoriteRecord;
use crate::format::PlaceReport;
use crate::search::{Place, PlaceId};
use clap::{Args, Subcommand};

/// Favorites command arguments
#[derive(Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: Option<FavoritesCommand>,
}

/// Favorites subcommands
#[derive(Subcommand)]
pub enum FavoritesCommand {
    /// List saved places
    List {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Save a place, or remove it if already saved
    Toggle(ToggleArgs),
    /// Remove a saved place by id
    Remove {
        /// Place id
        id: String,
    },
}

/// The place to toggle
#[derive(Args)]
pub struct ToggleArgs {
    /// Place id (e.g. "osm:node/123")
    #[arg(long)]
    pub id: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Display address
    #[arg(long)]
    pub address: Option<String>,

    /// Place category
    #[arg(long)]
    pub category: Option<String>,
}

impl ToggleArgs {
    fn to_place(&self) -> Result<Place> {
        let coordinate = Coordinate::new(self.lat, self.lng);
        coordinate.validate()?;

        let mut place = Place::new(PlaceId::new(self.id.clone()), Some(self.name.clone()), coordinate);
        if let Some(address) = &self.address {
            place = place.with_address(address.clone());
        }
        if let Some(category) = &self.category {
            place = place.with_category(category.clone());
        }
        Ok(place)
    }
}

/// Run the favorites command
pub fn run(args: FavoritesArgs) -> Result<()> {
    let config = Config::load()?;
    let store = config.open_favorites()?;

    match args.command {
        None => list_plain(&store.list()?),
        Some(FavoritesCommand::List { output }) => {
            if output.list_formats_requested() {
                return Ok(());
            }
            let places = store.list()?.iter().map(FavoriteRecord::to_place).collect();
            output.emit(&PlaceReport::new("Favorites", None, places))?;
        }
        Some(FavoritesCommand::Toggle(toggle)) => {
            let place = toggle.to_place()?;
            if store.toggle(&place)? {
                println!("Saved {}", place.name());
            } else {
                println!("Removed {}", place.name());
            }
        }
        Some(FavoritesCommand::Remove { id }) => {
            let removed = store.remove_id(&PlaceId::new(id.clone()))?;
            if removed == 0 {
                println!("No favorite with id {}", id);
            } else {
                println!("Removed {}", id);
            }
        }
    }

    Ok(())
}

/// Short listing used when no subcommand is given
fn list_plain(records: &[FavoriteRecord]) {
    if records.is_empty() {
        println!("No favorites.");
        return;
    }

    println!("Favorites ({}):\n", records.len());
    for record in records {
        println!(
            "  {} - {}\n    {} | saved {}\n",
            record.place_id,
            record.name,
            record.coordinate,
            record.saved_at.format("%Y-%m-%d %H:%M")
        );
    }
}
