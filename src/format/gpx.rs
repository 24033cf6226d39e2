//! GPX output formatter

use crate::error::Result;
use crate::format::{OutputFormatter, PlaceReport};

/// GPX formatter - outputs one waypoint per place
pub struct GpxFormatter;

/// Escape text for XML content and attributes
fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoint file"
    }

    fn format(&self, report: &PlaceReport) -> Result<String> {
        let mut gpx = String::new();

        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="place-finder">"#);
        gpx.push('\n');

        gpx.push_str("  <metadata>\n");
        gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(&report.title)));
        gpx.push_str(&format!("    <time>{}</time>\n", report.generated_at.to_rfc3339()));
        if let Some(viewport) = report.viewport {
            let (south, west, north, east) = viewport.bounds();
            gpx.push_str(&format!(
                r#"    <bounds minlat="{}" minlon="{}" maxlat="{}" maxlon="{}"/>"#,
                south, west, north, east
            ));
            gpx.push('\n');
        }
        gpx.push_str("  </metadata>\n");

        for place in &report.places {
            let coord = place.coordinate();
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                coord.latitude, coord.longitude
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(place.name())));
            if let Some(address) = place.address() {
                gpx.push_str(&format!("    <desc>{}</desc>\n", escape_xml(address)));
            }
            if let Some(category) = place.category() {
                gpx.push_str(&format!("    <type>{}</type>\n", escape_xml(category)));
            }
            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Region;
    use crate::format::sample_report;

    #[test]
    fn test_gpx_format() {
        let output = GpxFormatter.format(&sample_report()).unwrap();

        assert!(output.contains(r#"<?xml version="1.0""#));
        assert!(output.contains(r#"<gpx version="1.1" creator="place-finder">"#));
        assert!(output.contains(r#"<wpt lat="37.7856" lon="-122.409">"#));
        assert!(output.contains("<name>Hotel Nikko</name>"));
        assert!(output.contains("<type>hotel</type>"));
        assert!(output.contains("<name>Nearby &quot;Hotel&quot;</name>"));
        assert_eq!(output.matches("<wpt").count(), 2);
        assert!(output.ends_with("</gpx>\n"));
    }

    #[test]
    fn test_gpx_escapes_names() {
        let output = GpxFormatter.format(&sample_report()).unwrap();
        assert!(output.contains("<name>Bed &amp; Breakfast &lt;Inn&gt;</name>"));
    }

    #[test]
    fn test_gpx_bounds() {
        let mut report = sample_report();
        report.viewport = Some(Region::default());

        let output = GpxFormatter.format(&report).unwrap();
        assert!(output.contains(r#"<bounds minlat="-0.005" minlon="-0.005" maxlat="0.005" maxlon="0.005"/>"#));
    }

    #[test]
    fn test_gpx_formatter_info() {
        assert_eq!(GpxFormatter.name(), "gpx");
        assert!(!GpxFormatter.description().is_empty());
    }
}
