//! Output formatters
//!
//! Provides trait-based output formatting for place listings.

pub mod gpx;
pub mod json;
pub mod text;

use crate::coord::{Coordinate, Region};
use crate::error::Result;
use crate::search::{Place, SearchResults};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// A titled list of places ready for output
#[derive(Debug, Clone, Serialize)]
pub struct PlaceReport {
    /// What the listing is, e.g. `Nearby "Hotel"`
    pub title: String,
    /// Position the listing was produced for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    pub places: Vec<Place>,
    /// Region framing the places
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Region>,
    pub generated_at: DateTime<Utc>,
}

impl PlaceReport {
    pub fn new(title: impl Into<String>, center: Option<Coordinate>, places: Vec<Place>) -> Self {
        Self {
            title: title.into(),
            center,
            places,
            viewport: None,
            generated_at: Utc::now(),
        }
    }

    /// Report on a published result set
    pub fn from_results(
        title: impl Into<String>,
        center: Option<Coordinate>,
        results: &SearchResults,
    ) -> Self {
        Self {
            viewport: results.viewport,
            ..Self::new(title, center, results.places.clone())
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Render the report
    fn format(&self, report: &PlaceReport) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        &json::JsonFormatter as &dyn OutputFormatter,
        &text::TextFormatter,
        &gpx::GpxFormatter,
    ]
    .into_iter()
    .map(|f| FormatInfo {
        name: f.name().to_string(),
        description: f.description().to_string(),
    })
    .collect()
}

#[cfg(test)]
pub(crate) fn sample_report() -> PlaceReport {
    use crate::search::PlaceId;

    let center = Coordinate::new(37.7749, -122.4194);
    let places = vec![
        Place::new(
            PlaceId::new("osm:node/1"),
            Some("Hotel Nikko".to_string()),
            Coordinate::new(37.7856, -122.4090),
        )
        .with_address("222 Mason St, San Francisco")
        .with_category("hotel"),
        Place::new(
            PlaceId::new("osm:way/2"),
            Some("Bed & Breakfast <Inn>".to_string()),
            Coordinate::new(37.7690, -122.4300),
        ),
    ];

    PlaceReport::new("Nearby \"Hotel\"", Some(center), places)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("gpx").is_some());
        assert!(get_formatter("url").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
        assert!(get_formatter("GPX").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        let names: Vec<&str> = formats.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["json", "text", "gpx"]);
        assert!(formats.iter().all(|f| !f.description.is_empty()));
    }

    #[test]
    fn test_report_from_results_keeps_viewport() {
        let report = sample_report();
        let results = SearchResults {
            generation: 3,
            places: report.places.clone(),
            viewport: Some(Region::default()),
        };

        let framed = PlaceReport::from_results("Search", report.center, &results);
        assert_eq!(framed.places.len(), 2);
        assert_eq!(framed.viewport, Some(Region::default()));
    }
}
