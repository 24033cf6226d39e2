//! Position fix sources
//!
//! A `LocationSource` is the stream of fixes a tracker consumes. Channels,
//! line-oriented readers and the IP locator all implement it.

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::warn;

/// A single reported position sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_meters: Option<f64>,
}

impl Fix {
    /// Create a fix without altitude
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            altitude_meters: None,
        }
    }

    /// Attach an altitude reading
    pub fn with_altitude(mut self, meters: f64) -> Self {
        self.altitude_meters = Some(meters);
        self
    }
}

impl std::str::FromStr for Fix {
    type Err = Error;

    /// Parse "lat,lng" or "lat,lng,altitude"
    fn from_str(s: &str) -> Result<Self> {
        fn number(part: &str, what: &str) -> Result<f64> {
            part.parse()
                .map_err(|_| Error::InvalidCoordinates(format!("Invalid {}: '{}'", what, part)))
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let (lat, lng, altitude) = match parts.as_slice() {
            [lat, lng] => (number(lat, "latitude")?, number(lng, "longitude")?, None),
            [lat, lng, alt] => (
                number(lat, "latitude")?,
                number(lng, "longitude")?,
                Some(number(alt, "altitude")?),
            ),
            _ => {
                return Err(Error::InvalidCoordinates(format!(
                    "Expected 'lat,lng[,altitude]', got '{}'",
                    s
                )))
            }
        };

        let coordinate = Coordinate::new(lat, lng);
        coordinate.validate()?;

        let fix = Fix::new(coordinate);
        Ok(match altitude {
            Some(meters) => fix.with_altitude(meters),
            None => fix,
        })
    }
}

/// Trait for position fix streams
pub trait LocationSource: Send {
    /// Wait for the next fix; `None` ends the stream
    fn next_fix(&mut self) -> impl std::future::Future<Output = Option<Fix>> + Send;
}

impl LocationSource for mpsc::Receiver<Fix> {
    async fn next_fix(&mut self) -> Option<Fix> {
        self.recv().await
    }
}

/// Fixes read one per line ("lat,lng[,altitude]"); malformed lines are skipped
pub struct LineSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send> LocationSource for LineSource<R> {
    async fn next_fix(&mut self) -> Option<Fix> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    warn!("Failed to read fix: {}", e);
                    return None;
                }
            };

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.parse() {
                Ok(fix) => return Some(fix),
                Err(e) => warn!("Skipping fix: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[test]
    fn test_parse_fix() {
        let fix: Fix = "37.7749, -122.4194".parse().unwrap();
        assert_eq!(fix.coordinate, Coordinate::new(37.7749, -122.4194));
        assert_eq!(fix.altitude_meters, None);

        let fix: Fix = "37.7749,-122.4194,50".parse().unwrap();
        assert_eq!(fix.altitude_meters, Some(50.0));
    }

    #[test]
    fn test_parse_fix_invalid() {
        assert!("37.7749".parse::<Fix>().is_err());
        assert!("north,-122.4194".parse::<Fix>().is_err());
        assert!("95.0,0.0".parse::<Fix>().is_err());
        assert!("1,2,3,4".parse::<Fix>().is_err());
    }

    #[tokio::test]
    async fn test_channel_source() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Fix::new(Coordinate::new(1.0, 2.0))).await.unwrap();
        drop(tx);

        assert_eq!(rx.next_fix().await, Some(Fix::new(Coordinate::new(1.0, 2.0))));
        assert_eq!(rx.next_fix().await, None);
    }

    #[tokio::test]
    async fn test_line_source_skips_bad_lines() {
        let input = "# walk\n37.7749,-122.4194\n\nnot a fix\n37.7759,-122.4194,12.5\n";
        let mut source = LineSource::new(BufReader::new(input.as_bytes()));

        let first = source.next_fix().await.unwrap();
        assert_eq!(first.coordinate, Coordinate::new(37.7749, -122.4194));

        let second = source.next_fix().await.unwrap();
        assert_eq!(second.altitude_meters, Some(12.5));

        assert!(source.next_fix().await.is_none());
    }
}
