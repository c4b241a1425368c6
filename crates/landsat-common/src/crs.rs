//! Coordinate reference system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An EPSG authority code identifying a coordinate reference system.
///
/// Landsat Level-1 products ship in UTM (EPSG:326xx / 327xx) or, for
/// polar scenes, Polar Stereographic (EPSG:3031 / 3413).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SrsCode(pub u32);

impl SrsCode {
    /// WGS84 geographic (lat/lon in degrees).
    pub const WGS84: SrsCode = SrsCode(4326);

    /// Parse an authority string such as "EPSG:32633" or a bare code.
    pub fn parse(s: &str) -> Result<Self, SrsParseError> {
        let trimmed = s.trim();
        let code = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
            .unwrap_or(trimmed);

        code.parse::<u32>()
            .map(SrsCode)
            .map_err(|_| SrsParseError::Unrecognized(s.to_string()))
    }

    /// Check if this is a geographic (lat/lon) system.
    pub fn is_geographic(&self) -> bool {
        matches!(self.0, 4326 | 4269 | 4258)
    }

    /// Check if this is a UTM zone, the native system of non-polar
    /// Landsat scenes.
    pub fn is_utm(&self) -> bool {
        (32601..=32660).contains(&self.0) || (32701..=32760).contains(&self.0)
    }
}

impl fmt::Display for SrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for SrsCode {
    type Err = SrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SrsCode::parse(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SrsParseError {
    #[error("Unrecognized CRS identifier: {0}")]
    Unrecognized(String),
}
