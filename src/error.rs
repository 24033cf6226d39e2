//! Error types for place-finder

use thiserror::Error;

/// Main error type for place-finder operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Search error: {0}")]
    Search(String),

    /// Favorites could not be read or written. Never swallowed: losing a
    /// bookmark is a correctness issue, unlike a missed search.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type alias for place-finder operations
pub type Result<T> = std::result::Result<T, Error>;
