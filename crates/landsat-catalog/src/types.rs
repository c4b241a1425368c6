//! Search filter and scene record types.

use chrono::NaiveDate;
use landsat_common::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog dataset codes for the Landsat Collection 1 archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetCode {
    /// Landsat 4-5 Thematic Mapper
    LandsatTmC1,
    /// Landsat 7 ETM+
    LandsatEtmC1,
    /// Landsat 8 OLI/TIRS
    #[default]
    Landsat8C1,
}

impl DatasetCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetCode::LandsatTmC1 => "LANDSAT_TM_C1",
            DatasetCode::LandsatEtmC1 => "LANDSAT_ETM_C1",
            DatasetCode::Landsat8C1 => "LANDSAT_8_C1",
        }
    }
}

impl fmt::Display for DatasetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetCode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "LANDSAT_TM_C1" => Ok(DatasetCode::LandsatTmC1),
            "LANDSAT_ETM_C1" => Ok(DatasetCode::LandsatEtmC1),
            "LANDSAT_8_C1" => Ok(DatasetCode::Landsat8C1),
            other => Err(format!(
                "unknown dataset '{}': expected LANDSAT_TM_C1, LANDSAT_ETM_C1 or LANDSAT_8_C1",
                other
            )),
        }
    }
}

/// Scene search filters.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub dataset: DatasetCode,
    /// Area of interest; no bbox searches the whole archive.
    pub bbox: Option<BoundingBox>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Maximum scene cloud cover percentage.
    pub max_cloud_cover: Option<u8>,
}

/// One catalog search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    pub entity_id: String,
    pub display_id: String,
    pub acquisition_date: String,
    #[serde(default)]
    pub cloud_cover: f64,
}
