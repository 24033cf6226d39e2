//! place-finder CLI entry point
//!
//! Nearby place search, address lookup and favorites - CLI + web API

use place_finder::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
