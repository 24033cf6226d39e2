//! Address and altitude labels

use crate::constants::labels::ADDRESS_NOT_FOUND;
use crate::geo::Placemark;

/// Join the known parts of a placemark as "name, locality, area, country"
///
/// Absent or blank parts are skipped without leaving stray separators. A
/// placemark with no usable parts reads as not found.
pub fn format_address(placemark: &Placemark) -> String {
    let parts: Vec<&str> = [
        &placemark.name,
        &placemark.locality,
        &placemark.administrative_area,
        &placemark.country,
    ]
    .into_iter()
    .filter_map(|part| part.as_deref())
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        ADDRESS_NOT_FOUND.to_string()
    } else {
        parts.join(", ")
    }
}

/// Altitude label with millimeter precision, e.g. "Altitude: 50.000 meters"
pub fn format_altitude(meters: f64) -> String {
    format!("Altitude: {:.3} meters", meters)
}
