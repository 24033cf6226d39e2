//! JSON output formatter

use crate::error::Result;
use crate::format::{OutputFormatter, PlaceReport};

/// JSON formatter - outputs the full report as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format(&self, report: &PlaceReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_report;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter.format(&sample_report()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["title"], "Nearby \"Hotel\"");
        assert!(parsed.get("center").is_some());
        assert!(parsed.get("generated_at").is_some());
        assert!(parsed.get("viewport").is_none());

        let places = parsed["places"].as_array().unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0]["id"], "osm:node/1");
        assert_eq!(places[0]["category"], "hotel");
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
