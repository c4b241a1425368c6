//! Landsat scene identifier parsing.
//!
//! Collection 1 product identifiers look like
//! `LC08_L1TP_231094_20200111_20200824_01_T1`: sensor/satellite,
//! processing level, WRS-2 path/row, acquisition date, processing date,
//! collection number, and tier.

use chrono::NaiveDate;
use std::fmt;

/// Landsat sensor family carried in the first identifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    /// Thematic Mapper (Landsat 4-5)
    Tm,
    /// Enhanced Thematic Mapper Plus (Landsat 7)
    Etm,
    /// Operational Land Imager / TIRS (Landsat 8-9)
    Oli,
    /// Multispectral Scanner (Landsat 1-5)
    Mss,
}

/// A parsed Landsat product identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneId {
    /// Sensor family (from the LXSS prefix)
    pub sensor: Sensor,
    /// Satellite number (4, 5, 7, 8, 9)
    pub satellite: u8,
    /// WRS-2 path (001-233)
    pub path: u16,
    /// WRS-2 row (001-248)
    pub row: u16,
    /// Acquisition date
    pub acquisition_date: NaiveDate,
    /// The full identifier as given
    pub raw: String,
}

impl SceneId {
    /// Parse a Collection 1 product identifier.
    ///
    /// Band suffixes are tolerated: `LC08_..._T1_B4` parses the same as
    /// `LC08_..._T1`.
    pub fn parse(s: &str) -> Result<Self, SceneIdParseError> {
        let fields: Vec<&str> = s.split('_').collect();
        if fields.len() < 5 {
            return Err(SceneIdParseError::TooFewFields(s.to_string()));
        }

        let prefix = fields[0];
        if prefix.len() != 4 || !prefix.is_ascii() || !prefix.starts_with('L') {
            return Err(SceneIdParseError::BadPrefix(prefix.to_string()));
        }

        let sensor = match &prefix[1..2] {
            "C" | "O" => Sensor::Oli,
            "E" => Sensor::Etm,
            "T" => Sensor::Tm,
            "M" => Sensor::Mss,
            other => return Err(SceneIdParseError::UnknownSensor(other.to_string())),
        };

        let satellite: u8 = prefix[2..4]
            .parse()
            .map_err(|_| SceneIdParseError::BadPrefix(prefix.to_string()))?;

        let pathrow = fields[2];
        if pathrow.len() != 6 || !pathrow.is_ascii() {
            return Err(SceneIdParseError::BadPathRow(pathrow.to_string()));
        }
        let path: u16 = pathrow[0..3]
            .parse()
            .map_err(|_| SceneIdParseError::BadPathRow(pathrow.to_string()))?;
        let row: u16 = pathrow[3..6]
            .parse()
            .map_err(|_| SceneIdParseError::BadPathRow(pathrow.to_string()))?;

        let acquisition_date = NaiveDate::parse_from_str(fields[3], "%Y%m%d")
            .map_err(|_| SceneIdParseError::BadDate(fields[3].to_string()))?;

        Ok(Self {
            sensor,
            satellite,
            path,
            row,
            acquisition_date,
            raw: s.to_string(),
        })
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SceneIdParseError {
    #[error("Scene identifier has too few fields: {0}")]
    TooFewFields(String),

    #[error("Scene identifier prefix is not LXSS: {0}")]
    BadPrefix(String),

    #[error("Unknown sensor code: {0}")]
    UnknownSensor(String),

    #[error("Invalid WRS path/row field: {0}")]
    BadPathRow(String),

    #[error("Invalid acquisition date field: {0}")]
    BadDate(String),
}
