//! Human-readable text output formatter

use crate::coord::distance;
use crate::error::Result;
use crate::format::{OutputFormatter, PlaceReport};

/// Text formatter - outputs a numbered place list
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, report: &PlaceReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("{}\n", report.title));
        if let Some(center) = report.center {
            output.push_str(&format!("Center: {}\n", center));
        }
        output.push('\n');

        if report.places.is_empty() {
            output.push_str("No places found\n");
            return Ok(output);
        }

        for (i, place) in report.places.iter().enumerate() {
            output.push_str(&format!("{:>2}. {}", i + 1, place.name()));
            if let Some(category) = place.category() {
                output.push_str(&format!(" [{}]", category));
            }
            output.push('\n');

            output.push_str(&format!("    {}", place.coordinate()));
            if let Some(center) = report.center {
                output.push_str(&format!(
                    "  {:.0}m away",
                    distance(center, place.coordinate())
                ));
            }
            output.push('\n');

            if let Some(address) = place.address() {
                output.push_str(&format!("    {}\n", address));
            }
        }

        if let Some(viewport) = report.viewport {
            let (south, west, north, east) = viewport.bounds();
            output.push_str(&format!(
                "\nViewport: {:.6},{:.6} to {:.6},{:.6}\n",
                south, west, north, east
            ));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Coordinate, Region, Span};
    use crate::format::sample_report;

    #[test]
    fn test_text_format() {
        let output = TextFormatter.format(&sample_report()).unwrap();

        assert!(output.starts_with("Nearby \"Hotel\"\n"));
        assert!(output.contains("Center: (37.774900, -122.419400)"));
        assert!(output.contains(" 1. Hotel Nikko [hotel]"));
        assert!(output.contains("222 Mason St"));
        assert!(output.contains(" 2. Bed & Breakfast <Inn>"));
        assert!(output.contains("m away"));
        assert!(!output.contains("Viewport"));
    }

    #[test]
    fn test_text_format_viewport() {
        let mut report = sample_report();
        report.viewport = Some(Region::new(Coordinate::new(10.0, 20.0), Span::uniform(2.0)));

        let output = TextFormatter.format(&report).unwrap();
        assert!(output.contains("Viewport: 9.000000,19.000000 to 11.000000,21.000000"));
    }

    #[test]
    fn test_text_format_empty() {
        let mut report = sample_report();
        report.places.clear();

        let output = TextFormatter.format(&report).unwrap();
        assert!(output.contains("No places found"));
    }

    #[test]
    fn test_text_formatter_info() {
        assert_eq!(TextFormatter.name(), "text");
        assert!(!TextFormatter.description().is_empty());
    }
}
