//! GeoKey directory parsing (GeoTIFF 1.1, OGC 19-008r4).
//!
//! The GeoKey directory is a SHORT array stored in TIFF tag 34735. Its
//! layout mirrors a TIFF IFD: a four-short header followed by four-short
//! key entries.

use crate::error::{GeoTiffError, Result};

const GT_MODEL_TYPE: u16 = 1024;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

/// Whether the raster's model space is projected or geographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    Projected,
    Geographic,
    /// Geocentric or user-defined model types.
    Other(u16),
}

/// Coordinate reference information extracted from the GeoKey directory.
#[derive(Debug, Clone, Copy)]
pub struct GeoKeys {
    pub model_type: Option<ModelType>,
    /// EPSG code of the projected CRS (key 3072), if present and defined.
    pub projected_epsg: Option<u16>,
    /// EPSG code of the geographic CRS (key 2048), if present and defined.
    pub geographic_epsg: Option<u16>,
}

impl GeoKeys {
    /// The EPSG code a consumer should treat as the file's native system:
    /// the projected code when the model is projected, otherwise the
    /// geographic code.
    pub fn native_epsg(&self) -> Option<u32> {
        match self.model_type {
            Some(ModelType::Geographic) => self.geographic_epsg.map(u32::from),
            _ => self
                .projected_epsg
                .or(self.geographic_epsg)
                .map(u32::from),
        }
    }
}

/// Parse the raw SHORT array of tag 34735.
pub fn parse_geokey_directory(shorts: &[u16]) -> Result<GeoKeys> {
    if shorts.len() < 4 {
        return Err(GeoTiffError::BadGeoKeyDirectory(
            "directory shorter than header".into(),
        ));
    }

    let number_of_keys = shorts[3] as usize;
    let needed = 4 + number_of_keys * 4;
    if shorts.len() < needed {
        return Err(GeoTiffError::BadGeoKeyDirectory(format!(
            "header declares {} keys but array holds {}",
            number_of_keys,
            (shorts.len() - 4) / 4
        )));
    }

    let mut keys = GeoKeys {
        model_type: None,
        projected_epsg: None,
        geographic_epsg: None,
    };

    for entry in shorts[4..needed].chunks_exact(4) {
        let (key_id, tag_location, _count, value) = (entry[0], entry[1], entry[2], entry[3]);

        // Only inline SHORT values matter for the keys we read; values
        // stored in other tags (doubles, ASCII) are skipped.
        if tag_location != 0 {
            continue;
        }

        match key_id {
            GT_MODEL_TYPE => {
                keys.model_type = Some(match value {
                    1 => ModelType::Projected,
                    2 => ModelType::Geographic,
                    other => ModelType::Other(other),
                });
            }
            GEOGRAPHIC_TYPE if value != 0 && value != 32767 => {
                keys.geographic_epsg = Some(value);
            }
            PROJECTED_CS_TYPE if value != 0 && value != 32767 => {
                keys.projected_epsg = Some(value);
            }
            _ => {}
        }
    }

    Ok(keys)
}
